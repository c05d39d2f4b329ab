//! Gmail API gateway implementation.
//!
//! This module provides a [`MailboxGateway`] implementation using the Gmail
//! REST API. It handles OAuth 2.0 authentication and the message, thread,
//! and label operations the triage job needs.
//!
//! # Authentication
//!
//! Gmail uses OAuth 2.0. The refresh token and client credentials are
//! stored in the system keychain, referenced by account id; the gateway
//! refreshes the short-lived access token at startup.
//!
//! # API Usage
//!
//! This gateway uses the Gmail API v1:
//! - `users.messages.list` with a `q=` filter for candidate selection
//! - `users.messages.get` with `format=full` / `format=raw`
//! - `users.threads.get` for thread label state
//! - `users.messages.modify` for applying labels
//! - `users.labels.list` / `create` / `delete` for label setup

use async_trait::async_trait;
use base64::prelude::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::mailbox::{GatewayError, MailboxGateway, MessagePage, Result};
use crate::domain::{
    Address, Label, LabelId, LabelType, Message, MessageId, MessageStub, RawMessage, Thread,
    ThreadId, ThreadMessage,
};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Gmail message list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageListResponse {
    messages: Option<Vec<GmailMessageRef>>,
    next_page_token: Option<String>,
}

/// Gmail message stub as returned by listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessageRef {
    id: String,
    thread_id: String,
}

/// Gmail API message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailMessage {
    id: String,
    thread_id: String,
    label_ids: Option<Vec<String>>,
    payload: Option<GmailPayload>,
    raw: Option<String>,
}

/// Gmail message payload (headers and top-level parts).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPayload {
    headers: Option<Vec<GmailHeader>>,
    parts: Option<Vec<GmailPart>>,
}

/// Gmail message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Gmail message part. Only the filename matters here.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    filename: Option<String>,
}

/// Gmail API thread.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThread {
    id: String,
    messages: Option<Vec<GmailThreadMessage>>,
}

/// Per-message label state within a thread.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailThreadMessage {
    label_ids: Option<Vec<String>>,
}

/// Gmail API label.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailLabel {
    id: String,
    name: String,
    #[serde(rename = "type")]
    label_type: Option<String>,
}

/// Gmail labels list response.
#[derive(Debug, Deserialize)]
struct LabelsListResponse {
    labels: Option<Vec<GmailLabel>>,
}

/// Gmail modify request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ModifyRequest {
    add_label_ids: Vec<String>,
}

/// Gmail label creation body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateLabelRequest {
    name: String,
    message_list_visibility: &'static str,
    label_list_visibility: &'static str,
}

/// OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OAuth credentials stored in the keychain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailCredentials {
    /// OAuth refresh token.
    pub refresh_token: String,
    /// OAuth client ID.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
}

/// Gmail API gateway.
///
/// Implements [`MailboxGateway`] using the Gmail REST API with OAuth 2.0
/// authentication.
pub struct GmailMailbox {
    /// Account id for keychain credential lookup.
    account_id: String,
    /// HTTP client for API requests.
    client: reqwest::Client,
    /// OAuth credentials.
    credentials: Option<GmailCredentials>,
    /// Current OAuth access token (refreshed as needed).
    access_token: Option<String>,
}

impl GmailMailbox {
    /// Creates a new gateway for the specified account.
    ///
    /// The gateway is not usable until [`authenticate`](Self::authenticate)
    /// has run.
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            client: reqwest::Client::new(),
            credentials: None,
            access_token: None,
        }
    }

    /// Creates a gateway with explicit credentials (for direct use).
    pub fn with_credentials(account_id: impl Into<String>, credentials: GmailCredentials) -> Self {
        Self {
            account_id: account_id.into(),
            client: reqwest::Client::new(),
            credentials: Some(credentials),
            access_token: None,
        }
    }

    /// Returns whether an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Loads credentials from the system keychain.
    fn load_credentials_from_keychain(&self) -> Result<GmailCredentials> {
        let entry = keyring::Entry::new("mailroom", &format!("gmail-{}", self.account_id))
            .map_err(|e| GatewayError::Authentication(format!("keyring error: {e}")))?;

        let creds_json = entry
            .get_password()
            .map_err(|e| GatewayError::Authentication(format!("no credentials found: {e}")))?;

        serde_json::from_str(&creds_json)
            .map_err(|e| GatewayError::Authentication(format!("invalid credentials: {e}")))
    }

    /// Saves credentials to the system keychain.
    pub fn save_credentials_to_keychain(&self, credentials: &GmailCredentials) -> Result<()> {
        let entry = keyring::Entry::new("mailroom", &format!("gmail-{}", self.account_id))
            .map_err(|e| GatewayError::Authentication(format!("keyring error: {e}")))?;

        let creds_json = serde_json::to_string(credentials)
            .map_err(|e| GatewayError::Authentication(format!("serialize error: {e}")))?;

        entry
            .set_password(&creds_json)
            .map_err(|e| GatewayError::Authentication(format!("keyring error: {e}")))?;

        Ok(())
    }

    /// Refreshes the OAuth access token using the stored refresh token.
    ///
    /// Loads credentials from the keychain on first use.
    pub async fn authenticate(&mut self) -> Result<()> {
        if self.credentials.is_none() {
            self.credentials = Some(self.load_credentials_from_keychain()?);
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| GatewayError::Authentication("no credentials available".to_string()))?;

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", credentials.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Authentication(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Internal(format!("parse token response: {e}")))?;

        self.access_token = Some(token_response.access_token);
        tracing::info!(account_id = %self.account_id, "gmail gateway authenticated");
        Ok(())
    }

    /// Builds authorization headers for API requests.
    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self
            .access_token
            .as_ref()
            .ok_or_else(|| GatewayError::Authentication("not authenticated".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| GatewayError::Internal(format!("invalid header: {e}")))?,
        );
        Ok(headers)
    }

    /// Makes an authenticated GET request to the Gmail API.
    async fn get<T: for<'de> Deserialize<'de>>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{GMAIL_API_BASE}{endpoint}");
        let headers = self.auth_headers()?;

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request to the Gmail API.
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{GMAIL_API_BASE}{endpoint}");
        let mut headers = self.auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Makes an authenticated POST request that doesn't return a body.
    async fn post_no_response<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<()> {
        let url = format!("{GMAIL_API_BASE}{endpoint}");
        let mut headers = self.auth_headers()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }
        Ok(())
    }

    /// Makes an authenticated DELETE request to the Gmail API.
    async fn delete(&self, endpoint: &str) -> Result<()> {
        let url = format!("{GMAIL_API_BASE}{endpoint}");
        let headers = self.auth_headers()?;

        let response = self
            .client
            .delete(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }
        Ok(())
    }

    /// Handles API response, checking for errors.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.handle_error(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| GatewayError::Internal(format!("parse response: {e}")))
    }

    /// Handles API error responses.
    async fn handle_error(&self, response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => GatewayError::Authentication(format!("unauthorized: {body}")),
            404 => GatewayError::NotFound(body),
            429 => GatewayError::RateLimited {
                retry_after_secs: None,
            },
            _ => GatewayError::Internal(format!("API error ({status}): {body}")),
        }
    }
}

/// Converts a Gmail label to the domain type.
fn convert_label(label: GmailLabel) -> Label {
    let label_type = match label.label_type.as_deref() {
        Some("system") => LabelType::System,
        _ => LabelType::User,
    };
    Label {
        id: LabelId::from(label.id),
        name: label.name,
        label_type,
    }
}

/// Converts a Gmail message (format=full) to the domain metadata view.
fn convert_message(msg: GmailMessage) -> Message {
    let payload = msg.payload.as_ref();
    let headers = payload.and_then(|p| p.headers.as_ref());

    let from = headers
        .and_then(|h| {
            h.iter()
                .find(|hdr| hdr.name.eq_ignore_ascii_case("From"))
                .map(|hdr| hdr.value.as_str())
        })
        .map(Address::parse);

    let part_filenames = payload
        .and_then(|p| p.parts.as_ref())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.filename.clone())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let label_ids = msg
        .label_ids
        .unwrap_or_default()
        .into_iter()
        .map(LabelId::from)
        .collect();

    Message {
        id: MessageId::from(msg.id),
        thread_id: ThreadId::from(msg.thread_id),
        from,
        label_ids,
        part_filenames,
    }
}

#[async_trait]
impl MailboxGateway for GmailMailbox {
    async fn list_labels(&self) -> Result<Vec<Label>> {
        let response: LabelsListResponse = self.get("/labels").await?;
        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(convert_label)
            .collect())
    }

    async fn list_messages(
        &self,
        query: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<MessagePage> {
        let mut endpoint = format!("/messages?q={query}&maxResults={page_size}");
        if let Some(token) = page_token {
            endpoint.push_str(&format!("&pageToken={token}"));
        }

        let response: MessageListResponse = self.get(&endpoint).await?;
        let messages = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|stub| MessageStub {
                id: MessageId::from(stub.id),
                thread_id: ThreadId::from(stub.thread_id),
            })
            .collect();

        Ok(MessagePage {
            messages,
            next_page_token: response.next_page_token,
        })
    }

    async fn get_message(&self, id: &MessageId) -> Result<Message> {
        let endpoint = format!("/messages/{id}?format=full");
        let response: GmailMessage = self.get(&endpoint).await?;
        Ok(convert_message(response))
    }

    async fn get_raw(&self, id: &MessageId) -> Result<RawMessage> {
        let endpoint = format!("/messages/{id}?format=raw");
        let response: GmailMessage = self.get(&endpoint).await?;
        let encoded = response
            .raw
            .ok_or_else(|| GatewayError::Decode("raw message body missing".to_string()))?;
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|e| GatewayError::Decode(format!("raw message: {e}")))?;
        Ok(RawMessage(bytes))
    }

    async fn get_thread(&self, id: &ThreadId) -> Result<Thread> {
        let endpoint = format!("/threads/{id}?format=minimal");
        let response: GmailThread = self.get(&endpoint).await?;
        let messages = response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|msg| ThreadMessage {
                label_ids: msg
                    .label_ids
                    .unwrap_or_default()
                    .into_iter()
                    .map(LabelId::from)
                    .collect(),
            })
            .collect();

        Ok(Thread {
            id: ThreadId::from(response.id),
            messages,
        })
    }

    async fn add_labels(&self, id: &MessageId, label_ids: &[LabelId]) -> Result<()> {
        let endpoint = format!("/messages/{id}/modify");
        let body = ModifyRequest {
            add_label_ids: label_ids.iter().map(|l| l.0.clone()).collect(),
        };
        self.post_no_response(&endpoint, &body).await
    }

    async fn create_label(&self, name: &str) -> Result<Label> {
        let body = CreateLabelRequest {
            name: name.to_string(),
            message_list_visibility: "show",
            label_list_visibility: "labelShow",
        };
        let response: GmailLabel = self.post("/labels", &body).await?;
        Ok(convert_label(response))
    }

    async fn delete_label(&self, id: &LabelId) -> Result<()> {
        let endpoint = format!("/labels/{id}");
        self.delete(&endpoint).await
    }
}
