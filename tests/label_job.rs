//! End-to-end batch tests against an in-memory mailbox.
//!
//! These drive the whole pipeline — listing, classification, slug
//! scanning, thread checks, label application — through the gateway trait
//! with no live connection. Per-service logic is unit-tested next to each
//! service; this suite covers the batch-level behavior: failure isolation,
//! the unidentified fallback, and setup idempotency.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use mailroom::config::LabelSettings;
use mailroom::domain::{
    Label, LabelId, LabelType, Message, MessageId, MessageStub, RawMessage, SlugDirectory, Thread,
    ThreadId, ThreadMessage,
};
use mailroom::providers::{GatewayError, MailboxGateway, MessagePage};
use mailroom::services::{create_labels, LabelJob};

/// One stored message: metadata view plus raw source.
#[derive(Clone)]
struct StoredMessage {
    meta: Message,
    raw: String,
}

/// In-memory mailbox with injectable modify failures.
#[derive(Default)]
struct FakeMailbox {
    labels: Mutex<HashMap<String, Label>>,
    messages: Vec<StoredMessage>,
    fail_modify_for: HashSet<String>,
    applied: Mutex<HashMap<String, Vec<LabelId>>>,
    next_label_id: Mutex<u32>,
}

impl FakeMailbox {
    fn new() -> Self {
        Self::default()
    }

    fn add_message(
        &mut self,
        id: &str,
        thread: &str,
        from: &str,
        filenames: &[&str],
        body: &str,
    ) {
        let raw = format!(
            "From: {from}\r\nTo: records@example.org\r\nContent-Type: text/plain\r\n\r\n{body}\r\n"
        );
        self.messages.push(StoredMessage {
            meta: Message {
                id: MessageId::from(id),
                thread_id: ThreadId::from(thread),
                from: Some(mailroom::domain::Address::parse(from)),
                label_ids: vec![],
                part_filenames: filenames.iter().map(|s| s.to_string()).collect(),
            },
            raw,
        });
    }

    fn fail_modify(&mut self, id: &str) {
        self.fail_modify_for.insert(id.to_string());
    }

    fn applied_to(&self, id: &str) -> Vec<LabelId> {
        self.applied
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    fn label_id(&self, name: &str) -> LabelId {
        self.labels
            .lock()
            .unwrap()
            .get(name)
            .map(|l| l.id.clone())
            .unwrap_or_else(|| panic!("label {name} not created"))
    }
}

#[async_trait]
impl MailboxGateway for FakeMailbox {
    async fn list_labels(&self) -> Result<Vec<Label>, GatewayError> {
        Ok(self.labels.lock().unwrap().values().cloned().collect())
    }

    async fn list_messages(
        &self,
        _query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage, GatewayError> {
        // Pages through the stored messages to exercise the pagination loop.
        let start: usize = page_token.map(|t| t.parse().unwrap_or(0)).unwrap_or(0);
        let end = (start + page_size as usize).min(self.messages.len());
        let messages = self.messages[start..end]
            .iter()
            .map(|m| MessageStub {
                id: m.meta.id.clone(),
                thread_id: m.meta.thread_id.clone(),
            })
            .collect();
        let next_page_token = (end < self.messages.len()).then(|| end.to_string());
        Ok(MessagePage {
            messages,
            next_page_token,
        })
    }

    async fn get_message(&self, id: &MessageId) -> Result<Message, GatewayError> {
        self.messages
            .iter()
            .find(|m| m.meta.id == *id)
            .map(|m| m.meta.clone())
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn get_raw(&self, id: &MessageId) -> Result<RawMessage, GatewayError> {
        self.messages
            .iter()
            .find(|m| m.meta.id == *id)
            .map(|m| RawMessage::from(m.raw.as_str()))
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))
    }

    async fn get_thread(&self, id: &ThreadId) -> Result<Thread, GatewayError> {
        let applied = self.applied.lock().unwrap();
        let messages = self
            .messages
            .iter()
            .filter(|m| m.meta.thread_id == *id)
            .map(|m| {
                let mut label_ids = m.meta.label_ids.clone();
                label_ids.extend(applied.get(&m.meta.id.0).cloned().unwrap_or_default());
                ThreadMessage { label_ids }
            })
            .collect();
        Ok(Thread {
            id: id.clone(),
            messages,
        })
    }

    async fn add_labels(&self, id: &MessageId, label_ids: &[LabelId]) -> Result<(), GatewayError> {
        if self.fail_modify_for.contains(&id.0) {
            return Err(GatewayError::RateLimited {
                retry_after_secs: Some(30),
            });
        }
        let mut applied = self.applied.lock().unwrap();
        let entry = applied.entry(id.0.clone()).or_default();
        for label_id in label_ids {
            // Service semantics: adding a present id does not duplicate.
            if !entry.contains(label_id) {
                entry.push(label_id.clone());
            }
        }
        Ok(())
    }

    async fn create_label(&self, name: &str) -> Result<Label, GatewayError> {
        let mut labels = self.labels.lock().unwrap();
        if labels.contains_key(name) {
            return Err(GatewayError::Internal(format!(
                "API error (409): label {name} already exists"
            )));
        }
        let mut next = self.next_label_id.lock().unwrap();
        let label = Label {
            id: LabelId::from(format!("Label_{}", *next)),
            name: name.to_string(),
            label_type: LabelType::User,
        };
        *next += 1;
        labels.insert(name.to_string(), label.clone());
        Ok(label)
    }

    async fn delete_label(&self, id: &LabelId) -> Result<(), GatewayError> {
        let mut labels = self.labels.lock().unwrap();
        let name = labels
            .iter()
            .find(|(_, l)| l.id == *id)
            .map(|(n, _)| n.clone())
            .ok_or_else(|| GatewayError::NotFound(id.to_string()))?;
        labels.remove(&name);
        Ok(())
    }
}

fn directory() -> SlugDirectory {
    SlugDirectory::new(vec!["City Hall".to_string(), "Parks Dept".to_string()])
}

fn settings() -> LabelSettings {
    let mut settings = LabelSettings::default();
    settings.sender.domain = Some("example.org".to_string());
    // Small pages so every multi-message test walks the pagination loop.
    settings.page_size = 2;
    settings
}

async fn prepared_mailbox() -> FakeMailbox {
    let mailbox = FakeMailbox::new();
    create_labels(&mailbox, &directory(), &settings()).await;
    mailbox
}

#[tokio::test]
async fn one_failing_message_does_not_abort_the_batch() {
    let mut mailbox = prepared_mailbox().await;
    mailbox.add_message(
        "m1",
        "t1",
        "clerk@cityhall.gov",
        &["report.pdf"],
        "responsive records #CityHall# attached",
    );
    mailbox.add_message("m2", "t2", "parks@parks.gov", &[], "we received #ParksDept#");
    mailbox.add_message("m3", "t3", "water@water.gov", &[], "no token at all");
    mailbox.fail_modify("m2");

    let directory = directory();
    let settings = settings();
    let job = LabelJob::new(&mailbox, &directory, &settings).unwrap();
    let report = job.run(None).await.unwrap();

    assert_eq!(report.processed(), 3);
    assert_eq!(report.failures(), 1);
    assert!(report.outcomes[1].failed());
    assert!(report.outcomes[1]
        .error
        .as_deref()
        .unwrap()
        .contains("rate limit"));

    // Messages 1 and 3 were still labeled.
    assert_eq!(
        mailbox.applied_to("m1"),
        vec![
            mailbox.label_id("agency/City Hall"),
            mailbox.label_id("*attachment"),
        ]
    );
    assert_eq!(
        mailbox.applied_to("m3"),
        vec![
            mailbox.label_id("*unidentified"),
            mailbox.label_id("*responded"),
        ]
    );
    assert!(mailbox.applied_to("m2").is_empty());
}

#[tokio::test]
async fn our_own_mail_gets_agency_but_no_status() {
    let mut mailbox = prepared_mailbox().await;
    mailbox.add_message(
        "m1",
        "t1",
        "Records <records@example.org>",
        &["request.pdf"],
        "requesting records per statute #ParksDept# thanks",
    );

    let directory = directory();
    let settings = settings();
    let job = LabelJob::new(&mailbox, &directory, &settings).unwrap();
    let report = job.run(None).await.unwrap();

    assert_eq!(report.processed(), 1);
    assert_eq!(report.outcomes[0].status, None);
    assert_eq!(report.outcomes[0].agency.as_deref(), Some("Parks Dept"));
    assert_eq!(
        mailbox.applied_to("m1"),
        vec![mailbox.label_id("agency/Parks Dept")]
    );
}

#[tokio::test]
async fn tagged_thread_is_not_marked_unidentified() {
    let mut mailbox = prepared_mailbox().await;
    // First message in the thread carries the slug; the follow-up doesn't.
    mailbox.add_message(
        "m1",
        "t1",
        "parks@parks.gov",
        &[],
        "acknowledging your request #ParksDept#",
    );
    mailbox.add_message("m2", "t1", "parks@parks.gov", &[], "still working on it");

    let directory = directory();
    let settings = settings();
    let job = LabelJob::new(&mailbox, &directory, &settings).unwrap();
    let report = job.run(None).await.unwrap();

    assert_eq!(report.failures(), 0);
    let unidentified = mailbox.label_id("*unidentified");
    // The follow-up rode on the thread's agency tag instead of being
    // downgraded.
    assert!(!mailbox.applied_to("m2").contains(&unidentified));
    assert_eq!(report.outcomes[1].agency, None);
    assert!(mailbox
        .applied_to("m2")
        .contains(&mailbox.label_id("*responded")));
}

#[tokio::test]
async fn untagged_thread_gets_unidentified_exactly_once() {
    let mut mailbox = prepared_mailbox().await;
    mailbox.add_message("m1", "t1", "mystery@nowhere.net", &[], "who is this about?");

    let directory = directory();
    let settings = settings();
    let job = LabelJob::new(&mailbox, &directory, &settings).unwrap();
    job.run(None).await.unwrap();

    let unidentified = mailbox.label_id("*unidentified");
    let applied = mailbox.applied_to("m1");
    assert_eq!(
        applied.iter().filter(|id| **id == unidentified).count(),
        1
    );
}

#[tokio::test]
async fn slug_inside_base64_part_is_found_end_to_end() {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let mut mailbox = prepared_mailbox().await;
    let encoded = STANDARD.encode("responsive materials for #CityHall# enclosed");
    mailbox.add_message("m1", "t1", "clerk@cityhall.gov", &[], &encoded);

    let directory = directory();
    let settings = settings();
    let job = LabelJob::new(&mailbox, &directory, &settings).unwrap();
    let report = job.run(None).await.unwrap();

    assert_eq!(report.outcomes[0].agency.as_deref(), Some("City Hall"));
}

#[tokio::test]
async fn missing_sender_check_fails_before_processing() {
    let mailbox = prepared_mailbox().await;
    let directory = directory();
    let mut settings = settings();
    settings.sender.domain = None;
    settings.sender.address = None;

    assert!(LabelJob::new(&mailbox, &directory, &settings).is_err());
}

#[tokio::test]
async fn create_labels_is_idempotent_end_to_end() {
    let mailbox = FakeMailbox::new();
    let directory = directory();
    let settings = settings();

    let first = create_labels(&mailbox, &directory, &settings).await;
    assert_eq!(first.created.len(), 6);
    assert!(first.skipped.is_empty());

    let second = create_labels(&mailbox, &directory, &settings).await;
    assert!(second.created.is_empty());
    assert_eq!(second.skipped.len(), 6);
    for (_, reason) in &second.skipped {
        assert!(reason.contains("already exists"));
    }
}
