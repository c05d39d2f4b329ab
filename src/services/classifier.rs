//! Sender and attachment classification.
//!
//! Determines whether a message is inbound from a third party and, if so,
//! whether it delivered an accepted-extension attachment. Our own outbound
//! mail gets no status at all.

use std::collections::HashSet;

use crate::config::{ConfigError, SenderSettings};
use crate::domain::{Address, Message, RequestStatus};

/// How to recognize our own outbound address.
///
/// Exactly one mode is in effect. A contact occasionally replies from an
/// aliased mailbox on the same domain, which is what the domain mode is
/// for; the address mode pins a single shared mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SenderIdentity {
    /// Exact match on the portion of the address after `@`.
    Domain(String),
    /// Case-insensitive match on the whole address.
    Address(String),
}

impl SenderIdentity {
    /// Validates the configured sender check.
    ///
    /// When both modes are configured the domain check wins; neither
    /// configured is a startup error, raised before any message loop runs.
    pub fn from_settings(settings: &SenderSettings) -> Result<Self, ConfigError> {
        if let Some(domain) = &settings.domain {
            Ok(Self::Domain(domain.clone()))
        } else if let Some(address) = &settings.address {
            Ok(Self::Address(address.clone()))
        } else {
            Err(ConfigError::MissingSenderCheck)
        }
    }

    /// Returns true when the address is our own outbound identity.
    pub fn matches(&self, address: &Address) -> bool {
        match self {
            Self::Domain(domain) => address.domain() == Some(domain.as_str()),
            Self::Address(ours) => address.email.eq_ignore_ascii_case(ours),
        }
    }
}

/// Classifies messages by sender identity and attachment delivery.
pub struct MessageClassifier {
    identity: SenderIdentity,
    accepted_extensions: HashSet<String>,
}

impl MessageClassifier {
    /// Creates a classifier with the accepted extension set (lower-cased).
    pub fn new(identity: SenderIdentity, accepted_extensions: &[String]) -> Self {
        Self {
            identity,
            accepted_extensions: accepted_extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    /// Returns the message's workflow status.
    ///
    /// `None` for our own outbound mail (and for messages with no usable
    /// `From` header); otherwise `Attachment` when any top-level part's
    /// filename has an accepted extension, else `Responded`.
    pub fn classify(&self, message: &Message) -> Option<RequestStatus> {
        let from = message.from.as_ref()?;
        if self.identity.matches(from) {
            return None;
        }

        let delivered = message
            .part_filenames
            .iter()
            .any(|name| self.has_accepted_extension(name));

        if delivered {
            Some(RequestStatus::Attachment)
        } else {
            Some(RequestStatus::Responded)
        }
    }

    fn has_accepted_extension(&self, filename: &str) -> bool {
        // Final dot-delimited component; a dotless name is its own "extension".
        let extension = filename.rsplit('.').next().unwrap_or(filename);
        self.accepted_extensions.contains(&extension.to_lowercase())
    }
}
