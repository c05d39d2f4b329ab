//! Label decision engine.
//!
//! Combines the classifier and resolver outputs into a label plan per
//! message and applies it through the mailbox gateway. Lookups are by
//! exact label name against an index loaded once per run; a missing label
//! is a setup gap and skips that part of the plan, never an error.

use std::collections::{HashMap, HashSet};

use crate::config::LabelSettings;
use crate::domain::{agency_label_name, Classification, Label, LabelId, LabelPlan, ThreadId};
use crate::providers::{MailboxGateway, Result};

/// Read-only label lookup tables, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    by_name: HashMap<String, Label>,
    agency_ids: HashSet<LabelId>,
}

impl LabelIndex {
    /// Builds the index from a label listing.
    pub fn new(labels: Vec<Label>) -> Self {
        let agency_ids = labels
            .iter()
            .filter(|label| label.is_agency())
            .map(|label| label.id.clone())
            .collect();
        let by_name = labels
            .into_iter()
            .map(|label| (label.name.clone(), label))
            .collect();
        Self {
            by_name,
            agency_ids,
        }
    }

    /// Loads the index from the gateway.
    pub async fn load(gateway: &dyn MailboxGateway) -> Result<Self> {
        Ok(Self::new(gateway.list_labels().await?))
    }

    /// Looks up a label by exact display name.
    pub fn lookup(&self, name: &str) -> Option<&Label> {
        self.by_name.get(name)
    }

    /// Returns true when the id belongs to the agency label family.
    pub fn is_agency_id(&self, id: &LabelId) -> bool {
        self.agency_ids.contains(id)
    }

    /// Returns the number of indexed labels.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true when no labels are indexed.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Turns classifications into label plans and applies them.
pub struct Labeler<'a> {
    index: &'a LabelIndex,
    settings: &'a LabelSettings,
}

impl<'a> Labeler<'a> {
    /// Creates a labeler over a loaded index.
    pub fn new(index: &'a LabelIndex, settings: &'a LabelSettings) -> Self {
        Self { index, settings }
    }

    /// Builds the label plan for one classified message.
    ///
    /// Consults thread state only when no agency was resolved: a thread
    /// that already carries any agency-family label is left alone rather
    /// than downgraded to unidentified.
    pub async fn decide(
        &self,
        gateway: &dyn MailboxGateway,
        classification: &Classification,
    ) -> Result<LabelPlan> {
        let mut plan = LabelPlan::new(classification.message.id.clone());

        match &classification.agency {
            Some(agency) => {
                self.push_by_name(&mut plan, &agency_label_name(agency));
            }
            None => {
                let tagged = self
                    .thread_has_agency_label(gateway, &classification.message.thread_id)
                    .await?;
                if !tagged {
                    self.push_by_name(&mut plan, &self.settings.unidentified_label);
                }
            }
        }

        if let Some(status) = classification.status {
            self.push_by_name(&mut plan, self.settings.status_label_for(status));
        }

        Ok(plan)
    }

    /// Applies a plan with a single modify call.
    ///
    /// Adding an already-present label id is a no-op on the service side,
    /// so re-running a batch over the same messages is safe.
    pub async fn apply(&self, gateway: &dyn MailboxGateway, plan: &LabelPlan) -> Result<()> {
        for name in &plan.skipped {
            tracing::warn!(label = %name, message = %plan.message_id, "label not found, skipping");
        }
        if plan.is_empty() {
            return Ok(());
        }
        gateway.add_labels(&plan.message_id, &plan.add).await
    }

    fn push_by_name(&self, plan: &mut LabelPlan, name: &str) {
        match self.index.lookup(name) {
            Some(label) => plan.add.push(label.id.clone()),
            None => plan.skipped.push(name.to_string()),
        }
    }

    async fn thread_has_agency_label(
        &self,
        gateway: &dyn MailboxGateway,
        thread_id: &ThreadId,
    ) -> Result<bool> {
        let thread = gateway.get_thread(thread_id).await?;
        Ok(thread.messages.iter().any(|message| {
            message
                .label_ids
                .iter()
                .any(|id| self.index.is_agency_id(id))
        }))
    }
}
