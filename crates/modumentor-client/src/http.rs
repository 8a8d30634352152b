//! HTTP implementation of the [`Transport`] trait.
//!
//! Every call is a JSON `POST` below the configured base url.  The reply
//! body is decoded whatever the HTTP status, because the assistant reports
//! application errors as `{ "error": "..." }` with 4xx/5xx codes.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

use modumentor_chat::protocol::{ChatRequest, UserRequest};
use modumentor_chat::{ChatReply, ClearReply, ToolTestReply, Transport, TransportError};

use crate::config::ClientConfig;
use crate::error::Result;

const CHAT_PATH: &str = "api/chat";
const CLEAR_PATH: &str = "api/clear";
const HELP_PATH: &str = "api/help";
const TEST_TOOLS_PATH: &str = "api/test-tools";
const ANALYZE_PATH: &str = "api/analyze-conversation";

/// Talks to the assistant service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Build a transport from a validated config.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_base_url(config.base_url()?, config.request_timeout())
    }

    /// Build a transport for an explicit base url and timeout.
    pub fn with_base_url(mut base_url: Url, timeout: Duration) -> Result<Self> {
        // Endpoints are joined as relative paths, which needs a trailing
        // slash to keep any prefix.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("modumentor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `body` as JSON to `path` and return the raw response body.
    async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> modumentor_chat::Result<String> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::Request {
                reason: format!("invalid endpoint `{path}`: {e}"),
            })?;

        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_error(e))?;

        debug!(
            endpoint = path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            body_length = text.len(),
            "assistant request completed"
        );
        Ok(text)
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                seconds: self.timeout.as_secs().max(1),
            }
        } else if e.is_connect() {
            TransportError::Connect {
                reason: e.to_string(),
            }
        } else if e.is_decode() {
            TransportError::MalformedResponse {
                reason: e.to_string(),
            }
        } else {
            TransportError::Request {
                reason: e.to_string(),
            }
        }
    }

    fn user(user_id: &str) -> UserRequest {
        UserRequest {
            user_id: user_id.to_owned(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn chat(&self, message: &str, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        let body = ChatRequest {
            message: message.to_owned(),
            user_id: user_id.to_owned(),
        };
        ChatReply::from_json(&self.post(CHAT_PATH, &body).await?)
    }

    async fn clear_history(&self, user_id: &str) -> modumentor_chat::Result<ClearReply> {
        ClearReply::from_json(&self.post(CLEAR_PATH, &Self::user(user_id)).await?)
    }

    async fn help(&self, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        ChatReply::from_json(&self.post(HELP_PATH, &Self::user(user_id)).await?)
    }

    async fn test_tools(&self, user_id: &str) -> modumentor_chat::Result<ToolTestReply> {
        ToolTestReply::from_json(&self.post(TEST_TOOLS_PATH, &Self::user(user_id)).await?)
    }

    async fn analyze_conversation(&self, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        ChatReply::from_json(&self.post(ANALYZE_PATH, &Self::user(user_id)).await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
