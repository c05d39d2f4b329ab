//! Configuration and settings management.
//!
//! This module provides application settings types and file loading.
//! Settings are stored as JSON and read once at startup.

mod settings;

pub use settings::{
    AccountSettings, ConfigError, ContactsSettings, LabelSettings, SenderSettings, Settings,
};
