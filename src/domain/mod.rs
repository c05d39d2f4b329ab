//! Domain layer types for the mailroom triage pipeline.
//!
//! This module contains the core types used throughout the application:
//! agencies and their routing slugs, messages and threads as seen through
//! the mailbox gateway, the MIME part tree the scanner walks, and the
//! classification outcomes that drive labeling.

mod agency;
mod classification;
mod label;
mod message;
mod mime;
mod types;

pub use agency::{Agency, SlugDirectory};
pub use classification::{Classification, LabelPlan, RequestStatus};
pub use label::{agency_label_name, Label, LabelType, AGENCY_PARENT};
pub use message::{Address, Message, MessageStub, RawMessage, Thread, ThreadMessage};
pub use mime::MimeNode;
pub use types::{LabelId, MessageId, ThreadId};
