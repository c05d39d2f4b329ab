//! Contact directory collaborator.
//!
//! The contact directory maps agency names to their contact addresses. The
//! triage core only needs the agency names (slug derivation and label
//! naming); the per-contact addresses exist for the correspondence side of
//! the workflow and are carried through untouched.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading the contact directory.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// The contacts file could not be read.
    #[error("cannot read contacts file: {0}")]
    Io(#[from] std::io::Error),

    /// The contacts file is not valid JSON for the expected shape.
    #[error("cannot parse contacts file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One agency and its contact addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyContacts {
    /// Agency display name.
    pub agency: String,
    /// Contact addresses for the agency.
    #[serde(default)]
    pub contacts: Vec<String>,
}

/// Source of the agency→contacts mapping.
///
/// Implementations must return agencies in a stable order; slug-collision
/// resolution is first-match-wins over that order.
pub trait ContactSource {
    /// Returns every agency with its contacts, in directory order.
    fn contacts_by_agency(&self) -> Result<Vec<AgencyContacts>, ContactsError>;
}

/// Contact directory backed by an ordered JSON array on disk.
///
/// The file is a JSON array of `{"agency": ..., "contacts": [...]}`
/// objects; array order is the directory order.
#[derive(Debug, Clone)]
pub struct FileContacts {
    path: PathBuf,
}

impl FileContacts {
    /// Creates a directory reading from the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContactSource for FileContacts {
    fn contacts_by_agency(&self) -> Result<Vec<AgencyContacts>, ContactsError> {
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
