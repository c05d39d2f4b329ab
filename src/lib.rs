//! mailroom - batch triage for a public-records-request mailbox
//!
//! This crate inspects mail arriving in a shared mailbox, infers which
//! requesting agency a thread belongs to and whether a message delivered
//! an attachment, and applies mailbox labels accordingly.

pub mod cli;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;
