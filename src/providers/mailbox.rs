//! Mailbox gateway trait definition.
//!
//! This module defines the [`MailboxGateway`] trait which abstracts the
//! remote mail service. The batch job, labeler, and setup routines only
//! ever talk to this trait, so they can run against an in-memory gateway
//! in tests.

use async_trait::async_trait;

use crate::domain::{Label, LabelId, Message, MessageId, MessageStub, RawMessage, Thread, ThreadId};

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur during mailbox gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Authentication failed or credentials expired.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service returned a payload that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// One page of a message listing.
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    /// Message stubs on this page, in service order.
    pub messages: Vec<MessageStub>,
    /// Continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Trait for the remote mail service.
///
/// All calls are blocking remote calls from the core's point of view;
/// retries and backoff are the implementation's concern, never the
/// caller's. Adding a label id that is already present is a no-op on the
/// service side, which is what makes label application idempotent.
#[async_trait]
pub trait MailboxGateway: Send + Sync {
    /// Lists every label on the mailbox.
    async fn list_labels(&self) -> Result<Vec<Label>>;

    /// Lists message stubs matching a query, one page at a time.
    ///
    /// The query supports the service's search syntax, in particular
    /// `after:<date>` filters.
    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage>;

    /// Fetches a message's metadata view: sender, labels, part filenames.
    async fn get_message(&self, id: &MessageId) -> Result<Message>;

    /// Fetches a message's decoded raw RFC 5322 source.
    async fn get_raw(&self, id: &MessageId) -> Result<RawMessage>;

    /// Fetches the label state of every message in a thread.
    async fn get_thread(&self, id: &ThreadId) -> Result<Thread>;

    /// Adds labels to a message. Already-present ids are not duplicated.
    async fn add_labels(&self, id: &MessageId, label_ids: &[LabelId]) -> Result<()>;

    /// Creates a label by name. Fails if the name already exists.
    async fn create_label(&self, name: &str) -> Result<Label>;

    /// Deletes a label.
    async fn delete_label(&self, id: &LabelId) -> Result<()>;
}
