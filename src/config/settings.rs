//! Application settings and configuration types.
//!
//! Settings are loaded once at startup from a JSON file, either an explicit
//! path or `settings.json` in the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::RequestStatus;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("cannot read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file is not valid JSON for the expected shape.
    #[error("cannot parse settings file: {0}")]
    Parse(#[from] serde_json::Error),

    /// No platform config directory could be determined.
    #[error("no config directory available; pass an explicit settings path")]
    NoConfigDir,

    /// The sender identity check has neither a domain nor an address.
    #[error("sender identity check needs either a `domain` or an `address`")]
    MissingSenderCheck,
}

/// Top-level application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mailbox account settings.
    pub account: AccountSettings,
    /// Contact directory settings.
    pub contacts: ContactsSettings,
    /// Labeling behavior.
    pub labels: LabelSettings,
}

impl Settings {
    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Returns the default settings path in the platform config directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = directories::ProjectDirs::from("", "", "mailroom")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("settings.json"))
    }
}

/// Mailbox account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Account id used to look up mailbox credentials in the keychain.
    pub id: String,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            id: "default".to_string(),
        }
    }
}

/// Contact directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsSettings {
    /// Path to the agency contacts file (ordered JSON array).
    pub path: PathBuf,
}

impl Default for ContactsSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("contacts.json"),
        }
    }
}

/// Labeling behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Attachment extensions (lower-case, no dot) that count as delivery.
    pub accepted_extensions: Vec<String>,
    /// Label applied when an accepted attachment arrives.
    pub attachment_label: String,
    /// Label applied to inbound mail without an accepted attachment.
    pub responded_label: String,
    /// Label applied when no agency can be resolved for a fresh thread.
    pub unidentified_label: String,
    /// Page size for message listing.
    pub page_size: u32,
    /// Sender identity check configuration.
    pub sender: SenderSettings,
}

impl LabelSettings {
    /// Returns the status label names, for setup.
    pub fn status_labels(&self) -> [&str; 2] {
        [&self.attachment_label, &self.responded_label]
    }

    /// Returns the configured label name for a status.
    pub fn status_label_for(&self, status: RequestStatus) -> &str {
        match status {
            RequestStatus::Attachment => &self.attachment_label,
            RequestStatus::Responded => &self.responded_label,
        }
    }
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            accepted_extensions: ["pdf", "doc", "docx", "xls", "xlsx", "csv", "txt", "zip"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            attachment_label: "*attachment".to_string(),
            responded_label: "*responded".to_string(),
            unidentified_label: "*unidentified".to_string(),
            page_size: 100,
            sender: SenderSettings::default(),
        }
    }
}

/// Sender identity check: exactly one of `domain` or `address` must be set.
///
/// When both are present the domain check wins; when neither is present
/// startup fails before any message is processed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderSettings {
    /// Exact domain of our own outbound address (portion after `@`).
    pub domain: Option<String>,
    /// Our own outbound address, compared case-insensitively.
    pub address: Option<String>,
}
