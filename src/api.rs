//! REST fallback for the chat service.
//!
//! When the realtime socket is down the application can still send and fetch
//! messages over plain HTTP. Every endpoint answers the same envelope:
//!
//! ```json
//! { "code": 0, "msg": "SUCCESS", "data": { } }
//! ```
//!
//! `code == 0` means success; anything else becomes [`Error::Api`].
//!
//! # Endpoints
//!
//! | Method | Path | Call |
//! |--------|------|------|
//! | POST | `/chat/send` | [`ChatApi::send_message`] |
//! | GET | `/chat/messages` | [`ChatApi::get_messages`] |
//! | POST | `/chat/groups` | [`ChatApi::create_group`] |
//! | POST | `/chat/groups/{id}/join` | [`ChatApi::join_group`] |
//! | GET | `/chat/groups/{id}/messages` | [`ChatApi::get_group_messages`] |

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::ChatMessage;

// ============================================================================
// ChatApi
// ============================================================================

/// Typed client for the chat REST API.
#[derive(Debug, Clone)]
pub struct ChatApi {
    /// Shared HTTP client (connection pooling).
    http: reqwest::Client,
    /// Base URL without trailing slash, e.g. `http://localhost:8000/api`.
    base: String,
}

impl ChatApi {
    /// Creates an API client for `base_url` (`http` or `https`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the URL is unparseable or not HTTP.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let base_url = base_url.as_ref();
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::config(format!("invalid base URL `{base_url}`: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base URL scheme must be http or https, got `{}`",
                parsed.scheme()
            )));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Sends a chat message over HTTP instead of the socket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success envelope.
    pub async fn send_message(&self, message: &ChatMessage) -> Result<()> {
        debug!(to = %message.to, "sending message over http fallback");
        let response = self
            .http
            .post(self.url("/chat/send"))
            .json(message)
            .send()
            .await?;
        Self::unit_envelope(response).await
    }

    /// Fetches a page of message history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success envelope.
    pub async fn get_messages(&self, query: &MessageQuery) -> Result<Vec<MessageRecord>> {
        let response = self
            .http
            .get(self.url("/chat/messages"))
            .query(query)
            .send()
            .await?;
        Self::data_envelope(response).await
    }

    /// Creates a new group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success envelope.
    pub async fn create_group(&self, group: &NewGroup) -> Result<GroupRecord> {
        let response = self
            .http
            .post(self.url("/chat/groups"))
            .json(group)
            .send()
            .await?;
        Self::data_envelope(response).await
    }

    /// Joins an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success envelope.
    pub async fn join_group(&self, group_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/chat/groups/{group_id}/join")))
            .send()
            .await?;
        Self::unit_envelope(response).await
    }

    /// Fetches a page of group message history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure, [`Error::Api`] on a
    /// non-success envelope.
    pub async fn get_group_messages(
        &self,
        group_id: &str,
        query: &MessageQuery,
    ) -> Result<Vec<MessageRecord>> {
        let response = self
            .http
            .get(self.url(&format!("/chat/groups/{group_id}/messages")))
            .query(query)
            .send()
            .await?;
        Self::data_envelope(response).await
    }

    /// Joins `path` onto the base URL.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Parses an envelope and extracts its payload.
    async fn data_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let envelope: ApiEnvelope<T> = response.json().await?;
        if envelope.code != 0 {
            return Err(Error::api(envelope.code, envelope.msg));
        }
        envelope
            .data
            .ok_or_else(|| Error::api(0, "missing response data"))
    }

    /// Parses an envelope, discarding any payload.
    async fn unit_envelope(response: reqwest::Response) -> Result<()> {
        let envelope: ApiEnvelope<serde_json::Value> = response.json().await?;
        if envelope.code != 0 {
            return Err(Error::api(envelope.code, envelope.msg));
        }
        Ok(())
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Common response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    /// 0 on success.
    code: i32,
    /// Human-readable status.
    #[serde(default)]
    msg: String,
    /// Payload, absent for unit responses and failures.
    #[serde(default = "Option::default")]
    data: Option<T>,
}

// ============================================================================
// Query & Records
// ============================================================================

/// Paging query for message history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQuery {
    /// 1 = direct chat, 2 = group chat.
    pub message_type: i32,
    /// Identity of the requesting user.
    pub uuid: String,
    /// Peer user (direct) or group (group chat).
    pub friend_uuid: String,
    /// Page number, 1-based.
    pub page: i32,
    /// Page size.
    pub page_size: i32,
}

/// One message from the history endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageRecord {
    pub send_id: String,
    pub send_name: String,
    pub send_avatar: String,
    pub receive_id: String,
    /// Content kind label, e.g. `"Text"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub url: String,
    pub file_size: String,
    pub file_name: String,
    pub file_type: String,
    pub created_at: String,
    /// 1 = direct chat, 2 = group chat.
    pub message_type: i32,
}

/// Request body for group creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewGroup {
    /// Display name.
    pub name: String,
    /// Group description.
    pub intro: String,
}

/// A group as returned by the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupRecord {
    pub uuid: String,
    pub name: String,
    pub intro: String,
    pub member_count: i32,
}

// ============================================================================
// Tests
// ============================================================================
