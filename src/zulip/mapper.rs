// ABOUTME: Maps Zulip message JSON into chat messages and groups them into channels
// ABOUTME: One channel per (stream, topic); messages inside a channel are ordered by id

use super::PLATFORM;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use guanaco_core::{Channel, ChatMessage, Identity};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// The fields of a Zulip message object that agents use
#[derive(Debug, Clone, Deserialize)]
pub struct ZulipMessage {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    /// Numeric on real servers; some fixtures send strings
    pub sender_id: Value,
    #[serde(default)]
    pub sender_full_name: Option<String>,
    #[serde(default)]
    pub timestamp: f64,
    /// "stream" or "private"
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub stream_id: Option<Value>,
    /// Topic name (Zulip still calls it subject in message objects)
    #[serde(default)]
    pub subject: String,
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Key of the unread map for a stream/topic pair
pub fn channel_key(stream_id: &str, topic: &str) -> String {
    format!("{}/{}", stream_id, topic)
}

pub fn to_identity(message: &ZulipMessage) -> Result<Identity> {
    let sender_id = id_string(&message.sender_id)
        .with_context(|| format!("message {} has no usable sender_id", message.id))?;
    let identity = Identity::new(sender_id, PLATFORM)?;
    Ok(match &message.sender_full_name {
        Some(name) => identity.with_display_name(name.clone()),
        None => identity,
    })
}

pub fn to_chat_message(message: &ZulipMessage) -> Result<ChatMessage> {
    let sender = to_identity(message)?;
    let secs = message.timestamp.trunc() as i64;
    let nanos = (message.timestamp.fract() * 1e9) as u32;
    let created_at: DateTime<Utc> = DateTime::from_timestamp(secs, nanos)
        .with_context(|| format!("message {} has an invalid timestamp", message.id))?;

    Ok(ChatMessage::new(
        message.id.to_string(),
        message.content.clone(),
        sender,
        created_at,
    ))
}

/// Group stream messages into channels keyed by `"{stream_id}/{topic}"`.
///
/// Private messages and messages that cannot be mapped are skipped.
pub fn group_into_channels(mut messages: Vec<ZulipMessage>) -> HashMap<String, Channel> {
    messages.sort_by_key(|m| m.id);

    let mut grouped: HashMap<String, (String, String, Vec<ChatMessage>)> = HashMap::new();
    let mut skipped = 0usize;

    for message in &messages {
        let stream_id = match (message.kind.as_str(), message.stream_id.as_ref().and_then(id_string)) {
            ("stream", Some(stream_id)) => stream_id,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let chat_message = match to_chat_message(message) {
            Ok(chat_message) => chat_message,
            Err(e) => {
                tracing::warn!(message_id = message.id, error = %e, "Skipping unmappable Zulip message");
                skipped += 1;
                continue;
            }
        };

        grouped
            .entry(channel_key(&stream_id, &message.subject))
            .or_insert_with(|| (stream_id, message.subject.clone(), Vec::new()))
            .2
            .push(chat_message);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Ignored unread messages outside streams");
    }

    grouped
        .into_iter()
        .filter_map(|(key, (stream_id, topic, messages))| {
            Channel::new(stream_id, topic, messages)
                .ok()
                .map(|channel| (key, channel))
        })
        .collect()
}
