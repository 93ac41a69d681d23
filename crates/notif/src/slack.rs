//! Slack incoming-webhook notifier.
//!
//! Maps a [`Message`] to a single Slack attachment and delivers it with one
//! HTTP POST. Retries are left to [`crate::decorator::RetryNotifier`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::http_client;
use crate::message::{Message, Priority};
use crate::notifier::Notifier;
use crate::{Error, Result};

/// Name reported by [`SlackNotifier::name`] and used in its errors.
pub const SLACK_NAME: &str = "Slack";

/// Color used for unknown priority levels.
pub const DEFAULT_COLOR: &str = "#3AA3E3";

/// Response bodies kept in status errors are cut to this many bytes.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Slack channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook URL.
    pub webhook_url: String,
    /// Per-request timeout of the HTTP client in milliseconds. 0 disables it.
    pub timeout_ms: u64,
    /// Optional footer shown under every attachment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_ms: 10_000,
            footer: None,
        }
    }
}

impl SlackConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.webhook_url.trim().is_empty() {
            return Err(Error::config("slack webhook URL is empty"));
        }
        Url::parse(&self.webhook_url)
            .map_err(|e| Error::config(format!("invalid slack webhook URL: {e}")))?;
        Ok(())
    }
}

/// Slack webhook payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackPayload {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackAttachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Unix seconds.
    #[serde(rename = "ts", default, skip_serializing_if = "is_zero")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl SlackPayload {
    /// Build the payload for `msg`, stamped with the current time.
    pub fn from_message(msg: &Message, footer: Option<&str>) -> Self {
        let fields = msg
            .extra
            .iter()
            .map(|(key, value)| SlackField {
                title: key.clone(),
                value: render_value(value),
                short: true,
            })
            .collect();

        let attachment = SlackAttachment {
            color: color_for(msg.priority).to_string(),
            title: msg.title.clone(),
            title_link: msg.uri.clone().filter(|uri| !uri.is_empty()),
            text: msg.content.clone(),
            footer: footer.map(str::to_string),
            timestamp: chrono::Utc::now().timestamp(),
            fields,
        };

        Self {
            attachments: vec![attachment],
        }
    }
}

/// Presentation color for a priority.
pub fn color_for(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "#3AA3E3",    // Blue
        Priority::Normal => "#36a64f", // Green
        Priority::High => "#ff9900",   // Orange
        Priority::Urgent => "#ff0000", // Red
    }
}

/// Presentation color for a raw numeric level, [`DEFAULT_COLOR`] when the
/// level names no priority.
pub fn color_for_level(level: i64) -> &'static str {
    Priority::from_level(level)
        .map(color_for)
        .unwrap_or(DEFAULT_COLOR)
}

/// Strings render bare, everything else as its JSON text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read at most [`MAX_ERROR_BODY_LEN`] bytes of an error response.
///
/// The body is diagnostic only; a failed read keeps what arrived so far.
async fn read_error_body(mut response: Response) -> String {
    let mut buf = Vec::new();
    while buf.len() < MAX_ERROR_BODY_LEN {
        match response.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) | Err(_) => break,
        }
    }
    truncate_body(String::from_utf8_lossy(&buf).into_owned())
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_LEN {
        let mut cut = MAX_ERROR_BODY_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

/// Slack notifier.
///
/// Safe for concurrent sends: the only shared state is the pooled
/// `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    config: SlackConfig,
    client: Client,
}

impl SlackNotifier {
    /// Create a Slack notifier with its own HTTP client.
    pub fn new(config: SlackConfig) -> Result<Self> {
        config.validate()?;
        let client = http_client::build_client(config.timeout())?;
        Ok(Self { config, client })
    }

    /// Create a Slack notifier using a caller-supplied HTTP client.
    ///
    /// `config.timeout_ms` is ignored; the client's own timeout applies.
    pub fn with_client(config: SlackConfig, client: Client) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// The payload `send` would post for `msg`.
    pub fn build_payload(&self, msg: &Message) -> SlackPayload {
        SlackPayload::from_message(msg, self.config.footer.as_deref())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        let payload = self.build_payload(msg);
        let body = serde_json::to_vec(&payload).map_err(|source| Error::Serialization {
            backend: SLACK_NAME,
            source,
        })?;

        let request = self
            .client
            .post(&self.config.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = ctx
            .run(async {
                request
                    .send()
                    .await
                    .map_err(|e| Error::transport(SLACK_NAME, e))
            })
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = ctx.run(async { Ok(read_error_body(response).await) }).await?;
            debug!(%status, "Slack webhook rejected notification");
            return Err(Error::Status {
                backend: SLACK_NAME,
                status,
                body,
            });
        }

        debug!(title = %msg.title, "Slack notification sent");
        Ok(())
    }

    fn name(&self) -> &str {
        SLACK_NAME
    }
}
