//! Label domain types.
//!
//! Labels live on the mail service; this system only reads them and adds
//! them to messages. Two families matter here: agency labels (`agency`,
//! `agency/<name>`, plus the configured unidentified label) and status
//! labels (configured literal strings, conventionally `*`-prefixed).

use serde::{Deserialize, Serialize};

use super::LabelId;

/// Name of the parent label under which agency labels are nested.
pub const AGENCY_PARENT: &str = "agency";

/// A label as known to the mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Remote-assigned identifier.
    pub id: LabelId,
    /// Display name, used for exact-match lookups.
    pub name: String,
    /// Whether the service or a user created this label.
    pub label_type: LabelType,
}

impl Label {
    /// Returns true for labels in the agency family (`agency` itself and
    /// every `agency/<name>` child).
    pub fn is_agency(&self) -> bool {
        self.name.starts_with(AGENCY_PARENT)
    }
}

/// Origin of a label on the mail service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
    /// Built-in service label (INBOX, SENT, etc.). Never deleted by setup.
    System,
    /// User-created label.
    User,
}

/// Returns the label name for an agency display name (`agency/<name>`).
pub fn agency_label_name(agency: &str) -> String {
    format!("{AGENCY_PARENT}/{agency}")
}
