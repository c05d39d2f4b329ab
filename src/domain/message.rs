//! Message domain types.
//!
//! Messages are owned by the mail service and read-only here except for
//! label mutation. The metadata view carries just what classification
//! needs: the sender, the thread, current labels, and the filenames of
//! top-level MIME parts.

use serde::{Deserialize, Serialize};

use super::{LabelId, MessageId, ThreadId};

/// An email address with optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// The email address itself.
    pub email: String,
    /// Display name, if present.
    pub name: Option<String>,
}

impl Address {
    /// Creates an address without a display name.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Parses an address from a header value like `Name <email@example.com>`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let Some(start) = value.find('<') {
            if let Some(end) = value.find('>') {
                if end > start {
                    let email = value[start + 1..end].trim().to_string();
                    let name = value[..start].trim().trim_matches('"').to_string();
                    return Self {
                        email,
                        name: if name.is_empty() { None } else { Some(name) },
                    };
                }
            }
        }
        Self {
            email: value.to_string(),
            name: None,
        }
    }

    /// Returns the portion of the address after the last `@`, if any.
    pub fn domain(&self) -> Option<&str> {
        self.email.rsplit_once('@').map(|(_, domain)| domain)
    }
}

/// A message reference as returned by listing: just enough to fetch more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStub {
    /// Remote-assigned message id.
    pub id: MessageId,
    /// Thread the message belongs to.
    pub thread_id: ThreadId,
}

/// Metadata view of a message, fetched per-message during classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Remote-assigned message id.
    pub id: MessageId,
    /// Thread the message belongs to.
    pub thread_id: ThreadId,
    /// Sender, from the `From` header.
    pub from: Option<Address>,
    /// Labels currently on the message.
    pub label_ids: Vec<LabelId>,
    /// Filenames of top-level MIME parts that carry one (attachments).
    pub part_filenames: Vec<String>,
}

/// Decoded RFC 5322 source of a message.
///
/// The mail service transports raw messages base64url-encoded; the gateway
/// decodes before handing bytes to the scanner.
#[derive(Debug, Clone)]
pub struct RawMessage(pub Vec<u8>);

impl RawMessage {
    /// Returns the raw source bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for RawMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&str> for RawMessage {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

/// Label state of one message within a thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Labels currently on the message.
    pub label_ids: Vec<LabelId>,
}

/// The label-relevant view of a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Thread identifier.
    pub id: ThreadId,
    /// Per-message label state, in thread order.
    pub messages: Vec<ThreadMessage>,
}
