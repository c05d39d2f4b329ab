//! Classification outcome types.
//!
//! A `Classification` is produced once per message per run and consumed
//! immediately to build a `LabelPlan`; neither is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LabelId, MessageId, MessageStub};

/// Workflow state inferred for an inbound message.
///
/// Outbound messages from our own identity get no status at all, modeled
/// as `Option<RequestStatus>::None` by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// The message carries at least one accepted-extension attachment.
    Attachment,
    /// Inbound correspondence without an accepted attachment.
    Responded,
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Attachment => write!(f, "attachment"),
            RequestStatus::Responded => write!(f, "responded"),
        }
    }
}

/// The signals extracted from one message.
#[derive(Debug, Clone)]
pub struct Classification {
    /// The message the signals belong to.
    pub message: MessageStub,
    /// Inferred workflow status; `None` for our own outbound mail.
    pub status: Option<RequestStatus>,
    /// Resolved agency display name, if a slug matched.
    pub agency: Option<String>,
}

/// The labels to add to one message, plus lookups that found nothing.
#[derive(Debug, Clone)]
pub struct LabelPlan {
    /// Message the plan applies to.
    pub message_id: MessageId,
    /// Label ids to add in a single modify call.
    pub add: Vec<LabelId>,
    /// Label names that had no remote counterpart (setup gaps, skipped).
    pub skipped: Vec<String>,
}

impl LabelPlan {
    /// Creates an empty plan for a message.
    pub fn new(message_id: MessageId) -> Self {
        Self {
            message_id,
            add: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Returns true when the plan adds nothing.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty()
    }
}
