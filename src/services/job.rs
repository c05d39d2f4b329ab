//! Batch labeling job.
//!
//! Selects candidate messages by date, runs the classification pipeline
//! over each one in list order, and applies the resulting label plans.
//! Failures are isolated per message: a bad message is reported in the
//! batch outcome and the loop moves on.

use chrono::{Days, Local, NaiveDate};

use crate::config::{ConfigError, LabelSettings};
use crate::domain::{Classification, MessageId, MessageStub, RequestStatus, SlugDirectory};
use crate::providers::{MailboxGateway, Result};
use crate::services::{
    AgencyResolver, LabelIndex, Labeler, MessageClassifier, SenderIdentity,
};

/// Outcome of processing one message.
#[derive(Debug, Clone)]
pub struct MessageOutcome {
    /// The message processed.
    pub id: MessageId,
    /// Resolved agency name, if any.
    pub agency: Option<String>,
    /// Inferred workflow status, if any.
    pub status: Option<RequestStatus>,
    /// Error text when processing this message failed.
    pub error: Option<String>,
}

impl MessageOutcome {
    /// Returns true when processing this message failed.
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Per-message outcomes for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One entry per processed message, in list order.
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    /// Returns the number of messages processed.
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns the number of messages that failed.
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }
}

/// The batch labeling job.
pub struct LabelJob<'a> {
    gateway: &'a dyn MailboxGateway,
    directory: &'a SlugDirectory,
    settings: &'a LabelSettings,
    classifier: MessageClassifier,
}

impl<'a> LabelJob<'a> {
    /// Creates a job, validating the sender identity configuration.
    ///
    /// The configuration check runs here so a broken setup fails before
    /// any message is touched.
    pub fn new(
        gateway: &'a dyn MailboxGateway,
        directory: &'a SlugDirectory,
        settings: &'a LabelSettings,
    ) -> std::result::Result<Self, ConfigError> {
        let identity = SenderIdentity::from_settings(&settings.sender)?;
        let classifier = MessageClassifier::new(identity, &settings.accepted_extensions);
        Ok(Self {
            gateway,
            directory,
            settings,
            classifier,
        })
    }

    /// Runs the job over all messages on or after the given date.
    ///
    /// The date defaults to yesterday; the service interprets the query
    /// date at local midnight.
    pub async fn run(&self, date: Option<NaiveDate>) -> Result<BatchReport> {
        let date = date.unwrap_or_else(yesterday);
        let query = format!("after:{}", date.format("%Y/%m/%d"));
        tracing::info!(%query, agencies = self.directory.len(), "starting label job");

        let index = LabelIndex::load(self.gateway).await?;
        let labeler = Labeler::new(&index, self.settings);
        let resolver = AgencyResolver::new(self.directory);
        let stubs = self.select_messages(&query).await?;

        let mut report = BatchReport::default();
        for stub in stubs {
            let outcome = self.process(&labeler, &resolver, &stub).await;
            match &outcome.error {
                Some(error) => {
                    tracing::warn!(id = %outcome.id, %error, "message failed");
                }
                None => {
                    tracing::info!(
                        id = %outcome.id,
                        agency = outcome.agency.as_deref().unwrap_or("-"),
                        status = %outcome.status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                        "labeled"
                    );
                }
            }
            report.outcomes.push(outcome);
        }

        tracing::info!(
            processed = report.processed(),
            failures = report.failures(),
            "label job finished"
        );
        Ok(report)
    }

    /// Lists every matching message stub, following continuation tokens.
    async fn select_messages(&self, query: &str) -> Result<Vec<MessageStub>> {
        let mut stubs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .gateway
                .list_messages(query, self.settings.page_size, page_token.as_deref())
                .await?;
            stubs.extend(page.messages);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(stubs)
    }

    /// Processes one message, capturing any failure in the outcome.
    async fn process(
        &self,
        labeler: &Labeler<'_>,
        resolver: &AgencyResolver<'_>,
        stub: &MessageStub,
    ) -> MessageOutcome {
        match self.process_inner(labeler, resolver, stub).await {
            Ok(outcome) => outcome,
            Err(error) => MessageOutcome {
                id: stub.id.clone(),
                agency: None,
                status: None,
                error: Some(error.to_string()),
            },
        }
    }

    async fn process_inner(
        &self,
        labeler: &Labeler<'_>,
        resolver: &AgencyResolver<'_>,
        stub: &MessageStub,
    ) -> Result<MessageOutcome> {
        let message = self.gateway.get_message(&stub.id).await?;
        let status = self.classifier.classify(&message);

        let raw = self.gateway.get_raw(&stub.id).await?;
        let agency = resolver.resolve(&raw).map(|a| a.name.clone());

        let classification = Classification {
            message: stub.clone(),
            status,
            agency: agency.clone(),
        };
        let plan = labeler.decide(self.gateway, &classification).await?;
        labeler.apply(self.gateway, &plan).await?;

        Ok(MessageOutcome {
            id: stub.id.clone(),
            agency,
            status,
            error: None,
        })
    }
}

/// Returns the local date one day ago.
fn yesterday() -> NaiveDate {
    Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap_or_else(|| Local::now().date_naive())
}
