// ABOUTME: ChatTransport double that serves canned unread channels and records every call
// ABOUTME: Marking a channel read removes it from the unread set, like a real platform

use crate::channel::Channel;
use crate::error::TransportError;
use crate::identity::Identity;
use crate::traits::ChatTransport;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One call made against a [`RecordingTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    FetchUnread,
    SendChannel {
        text: String,
        channel_id: String,
        topic: String,
    },
    MarkRead {
        channel_id: String,
        topic: String,
    },
    SendPrivate {
        text: String,
        recipient: String,
    },
    SendThread {
        text: String,
        thread_id: String,
        topic: String,
    },
}

#[derive(Default)]
struct Failures {
    fetch: Option<String>,
    send: Option<String>,
    mark_read: Option<String>,
}

/// Transport double for tests
pub struct RecordingTransport {
    unread: Mutex<HashMap<String, Channel>>,
    calls: Mutex<Vec<TransportCall>>,
    failures: Failures,
    fetch_delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            unread: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failures: Failures::default(),
            fetch_delay: None,
        }
    }

    /// Add an unread channel keyed by its id
    pub fn with_channel(self, channel: Channel) -> Self {
        self.lock_unread()
            .insert(channel.id().to_string(), channel);
        self
    }

    /// Every unread fetch fails with a platform error
    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.failures.fetch = Some(message.to_string());
        self
    }

    /// Every channel send fails with a platform error
    pub fn failing_send(mut self, message: &str) -> Self {
        self.failures.send = Some(message.to_string());
        self
    }

    /// Every mark-as-read fails with a platform error
    pub fn failing_mark_read(mut self, message: &str) -> Self {
        self.failures.mark_read = Some(message.to_string());
        self
    }

    /// Sleep this long inside each unread fetch
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Put a channel (back) into the unread set
    pub fn push_unread(&self, channel: Channel) {
        self.lock_unread()
            .insert(channel.id().to_string(), channel);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// `(text, channel_id, topic)` of every channel send, in call order
    pub fn sent(&self) -> Vec<(String, String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::SendChannel {
                    text,
                    channel_id,
                    topic,
                } => Some((text, channel_id, topic)),
                _ => None,
            })
            .collect()
    }

    /// Channel ids acknowledged, in call order
    pub fn marked_read(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::MarkRead { channel_id, .. } => Some(channel_id),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::FetchUnread))
            .count()
    }

    fn record(&self, call: TransportCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn lock_unread(&self) -> std::sync::MutexGuard<'_, HashMap<String, Channel>> {
        self.unread.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fail_with(message: &Option<String>) -> Result<()> {
        match message {
            Some(message) => Err(TransportError::new(super::TEST_PLATFORM, message.as_str()).into()),
            None => Ok(()),
        }
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn get_channels_with_unread(&self) -> Result<HashMap<String, Channel>> {
        self.record(TransportCall::FetchUnread);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        Self::fail_with(&self.failures.fetch)?;
        Ok(self.lock_unread().clone())
    }

    async fn send_channel_message(&self, text: &str, channel_id: &str, topic: &str) -> Result<()> {
        self.record(TransportCall::SendChannel {
            text: text.to_string(),
            channel_id: channel_id.to_string(),
            topic: topic.to_string(),
        });
        Self::fail_with(&self.failures.send)
    }

    async fn mark_as_read(&self, channel: &Channel) -> Result<()> {
        self.record(TransportCall::MarkRead {
            channel_id: channel.id().to_string(),
            topic: channel.topic().to_string(),
        });
        Self::fail_with(&self.failures.mark_read)?;
        self.lock_unread().retain(|_, unread| unread != channel);
        Ok(())
    }

    async fn send_private_message(&self, text: &str, recipient: &Identity) -> Result<()> {
        self.record(TransportCall::SendPrivate {
            text: text.to_string(),
            recipient: recipient.platform_id().to_string(),
        });
        Self::fail_with(&self.failures.send)
    }

    async fn send_thread_message(&self, text: &str, thread_id: &str, topic: &str) -> Result<()> {
        self.record(TransportCall::SendThread {
            text: text.to_string(),
            thread_id: thread_id.to_string(),
            topic: topic.to_string(),
        });
        Self::fail_with(&self.failures.send)
    }

    fn platform(&self) -> &str {
        super::TEST_PLATFORM
    }
}
