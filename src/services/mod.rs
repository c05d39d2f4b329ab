//! Triage services layer.
//!
//! This module contains the classification pipeline and the batch job that
//! drives it:
//!
//! ```text
//! CLI (run / create-labels / delete-labels)
//!          |
//!          v
//!     LabelJob  -- per message -->  classifier + scanner/resolver
//!          |                               |
//!          v                               v
//!       Labeler  <---- Classification ----'
//!          |
//!          v
//!   MailboxGateway (remote mail service)
//! ```
//!
//! Everything here depends on the gateway trait only; the shared lookup
//! tables ([`LabelIndex`], [`crate::domain::SlugDirectory`]) are built
//! once per run and passed in explicitly.

mod classifier;
mod job;
mod labeler;
mod resolver;
mod scanner;
mod setup;

pub use classifier::{MessageClassifier, SenderIdentity};
pub use job::{BatchReport, LabelJob, MessageOutcome};
pub use labeler::{LabelIndex, Labeler};
pub use resolver::AgencyResolver;
pub use scanner::SlugScanner;
pub use setup::{create_labels, delete_labels, SetupReport};
