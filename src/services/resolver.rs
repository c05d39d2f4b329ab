//! Agency resolution from message content.
//!
//! The slug embedded in the correspondence body is the only signal used to
//! tie a message to an agency. Inferring the agency from the sender
//! address is deliberately not supported: a contact can send on behalf of
//! more than one agency, so address matching produces false routes.

use crate::domain::{Agency, MimeNode, RawMessage, SlugDirectory};
use crate::services::SlugScanner;

/// Resolves the agency a message belongs to, if any.
pub struct AgencyResolver<'a> {
    directory: &'a SlugDirectory,
    scanner: SlugScanner<'a>,
}

impl<'a> AgencyResolver<'a> {
    /// Creates a resolver over the given directory.
    pub fn new(directory: &'a SlugDirectory) -> Self {
        Self {
            directory,
            scanner: SlugScanner::new(directory),
        }
    }

    /// Scans a raw message for a slug and looks it up in the directory.
    ///
    /// Unparseable sources and unmatched slugs both resolve to `None`;
    /// neither is an error.
    pub fn resolve(&self, raw: &RawMessage) -> Option<&'a Agency> {
        let root = MimeNode::parse(raw.as_bytes())?;
        let chunk = self.scanner.scan(&root)?;
        self.directory.resolve(&chunk)
    }
}
