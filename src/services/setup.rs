//! Label setup and teardown.
//!
//! Creating labels is a first-time (and after-contact-changes) setup step:
//! the agency parent, one label per agency, the status labels, and the
//! unidentified fallback. Creation conflicts are reported and skipped so
//! the command can be re-run safely. Deletion is the destructive inverse,
//! gated behind a confirmation when no explicit ids are given.

use crate::config::LabelSettings;
use crate::domain::{LabelId, LabelType, SlugDirectory};
use crate::providers::{MailboxGateway, Result};

/// What label creation did, per name.
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    /// Names created on this run.
    pub created: Vec<String>,
    /// Names skipped, with the service's reason (usually: already exists).
    pub skipped: Vec<(String, String)>,
}

/// Creates the full label set for the configured agencies and statuses.
///
/// Per-label failures are collected as skips; the run itself never fails,
/// which makes the command idempotent.
pub async fn create_labels(
    gateway: &dyn MailboxGateway,
    directory: &SlugDirectory,
    settings: &LabelSettings,
) -> SetupReport {
    let mut names = vec![crate::domain::AGENCY_PARENT.to_string()];
    names.extend(directory.agencies().iter().map(|a| a.label_name()));
    names.extend(settings.status_labels().iter().map(|s| s.to_string()));
    names.push(settings.unidentified_label.clone());

    let mut report = SetupReport::default();
    for name in names {
        match gateway.create_label(&name).await {
            Ok(label) => {
                tracing::info!(name = %label.name, id = %label.id, "created label");
                report.created.push(label.name);
            }
            Err(error) => {
                tracing::warn!(%name, %error, "skipping label");
                report.skipped.push((name, error.to_string()));
            }
        }
    }
    report
}

/// Deletes labels by id, or every user label after confirmation.
///
/// With no explicit ids, `confirm` gates a full wipe of user-type labels;
/// declining deletes nothing. Per-label failures are reported and do not
/// stop the remaining deletions. Returns the ids actually deleted.
pub async fn delete_labels(
    gateway: &dyn MailboxGateway,
    ids: Option<Vec<LabelId>>,
    confirm: impl FnOnce() -> bool,
) -> Result<Vec<LabelId>> {
    let ids = match ids {
        Some(ids) => ids,
        None => {
            if !confirm() {
                tracing::info!("wipe declined, nothing deleted");
                return Ok(Vec::new());
            }
            gateway
                .list_labels()
                .await?
                .into_iter()
                .filter(|label| label.label_type == LabelType::User)
                .map(|label| label.id)
                .collect()
        }
    };

    let mut deleted = Vec::new();
    for id in ids {
        match gateway.delete_label(&id).await {
            Ok(()) => {
                tracing::info!(%id, "deleted label");
                deleted.push(id);
            }
            Err(error) => {
                tracing::warn!(%id, %error, "could not delete label");
            }
        }
    }
    Ok(deleted)
}
