// ABOUTME: ChatTransport over the Zulip REST API using HTTP basic auth
// ABOUTME: Any response whose result is not "success" becomes a TransportError with Zulip's msg

use super::mapper::{self, ZulipMessage};
use super::PLATFORM;
use crate::config::ZulipConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use guanaco_core::{Channel, ChatTransport, Identity, TransportError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Messages fetched per unread poll
pub const UNREAD_BATCH: u32 = 50;

/// One bot account on one Zulip server
pub struct ZulipTransport {
    site: String,
    email: String,
    api_key: String,
    client: reqwest::Client,
}

impl ZulipTransport {
    pub fn new(config: &ZulipConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("Zulip API key is required")?;
        if config.site.trim().is_empty() {
            anyhow::bail!("Zulip site is required");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            site: config.site.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_key,
            client,
        })
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.site, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.email, Some(&self.api_key))
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;
        check_response(response).await
    }

    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<Value> {
        let response = self
            .client
            .post(self.url(path))
            .basic_auth(&self.email, Some(&self.api_key))
            .form(form)
            .send()
            .await
            .with_context(|| format!("POST {} failed", path))?;
        check_response(response).await
    }

    /// The bot account's own identity (`GET /users/me`)
    pub async fn own_identity(&self) -> Result<Identity> {
        let body = self.get("users/me", &[]).await?;
        let user_id = body
            .get("user_id")
            .and_then(Value::as_u64)
            .context("users/me response has no user_id")?;
        let identity = Identity::new(user_id.to_string(), PLATFORM)?;
        Ok(match body.get("full_name").and_then(Value::as_str) {
            Some(name) => identity.with_display_name(name),
            None => identity,
        })
    }

    async fn send_stream_message(&self, text: &str, to: &str, topic: &str) -> Result<()> {
        self.post_form(
            "messages",
            &[
                ("type", "stream".to_string()),
                ("to", to.to_string()),
                ("topic", topic.to_string()),
                ("content", text.to_string()),
            ],
        )
        .await?;
        Ok(())
    }
}

/// Turn a Zulip response into its JSON body or a [`TransportError`]
async fn check_response(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await.context("Failed to read Zulip response")?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    if body.get("result").and_then(Value::as_str) == Some("success") && status.is_success() {
        return Ok(body);
    }

    let message = body
        .get("msg")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));
    metrics::counter!("guanaco_zulip_api_errors_total", "status" => status.as_u16().to_string())
        .increment(1);
    Err(TransportError::new(PLATFORM, message).into())
}

#[async_trait]
impl ChatTransport for ZulipTransport {
    async fn get_channels_with_unread(&self) -> Result<HashMap<String, Channel>> {
        let narrow = json!([{"operator": "is", "operand": "unread"}]).to_string();
        let body = self
            .get(
                "messages",
                &[
                    ("anchor", "newest".to_string()),
                    ("num_before", UNREAD_BATCH.to_string()),
                    ("num_after", "0".to_string()),
                    ("narrow", narrow),
                    ("apply_markdown", "false".to_string()),
                ],
            )
            .await?;

        let messages: Vec<ZulipMessage> = match body.get("messages") {
            Some(messages) => serde_json::from_value(messages.clone())
                .context("Unexpected message format from Zulip")?,
            None => Vec::new(),
        };

        tracing::debug!(site = %self.site, unread = messages.len(), "Fetched unread Zulip messages");
        Ok(mapper::group_into_channels(messages))
    }

    async fn send_channel_message(&self, text: &str, channel_id: &str, topic: &str) -> Result<()> {
        self.send_stream_message(text, channel_id, topic).await
    }

    async fn mark_as_read(&self, channel: &Channel) -> Result<()> {
        let ids = channel
            .messages()
            .iter()
            .map(|m| {
                m.id.parse::<u64>()
                    .with_context(|| format!("Zulip message id is not numeric: {}", m.id))
            })
            .collect::<Result<Vec<u64>>>()?;

        self.post_form(
            "messages/flags",
            &[
                ("messages", json!(ids).to_string()),
                ("op", "add".to_string()),
                ("flag", "read".to_string()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn send_private_message(&self, text: &str, recipient: &Identity) -> Result<()> {
        // Zulip takes user ids, or emails for accounts addressed by email
        let to = match recipient.platform_id().parse::<u64>() {
            Ok(user_id) => json!([user_id]),
            Err(_) => json!([recipient.platform_id()]),
        };

        self.post_form(
            "messages",
            &[
                ("type", "private".to_string()),
                ("to", to.to_string()),
                ("content", text.to_string()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn send_thread_message(&self, text: &str, thread_id: &str, topic: &str) -> Result<()> {
        self.send_stream_message(text, thread_id, topic).await
    }

    fn platform(&self) -> &str {
        PLATFORM
    }
}
