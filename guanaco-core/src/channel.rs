// ABOUTME: Chat messages and the channels (stream + topic) they arrive in
// ABOUTME: A channel replies through a borrowed transport: send first, then mark read

use crate::error::ChannelError;
use crate::identity::Identity;
use crate::traits::ChatTransport;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single message as seen by an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    /// Message body; may be empty
    pub content: String,
    pub sender: Identity,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        sender: Identity,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            sender,
            created_at,
        }
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.created_at.to_rfc3339(),
            self.sender,
            self.content
        )
    }
}

/// A channel/topic pair with the unread messages that put it in front of an agent.
///
/// Channels are rebuilt by the transport on every poll and thrown away after
/// the cycle. `messages` is never empty.
#[derive(Debug, Clone)]
pub struct Channel {
    id: String,
    topic: String,
    messages: Vec<ChatMessage>,
}

impl Channel {
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        messages: Vec<ChatMessage>,
    ) -> Result<Self, ChannelError> {
        let id = id.into();
        if messages.is_empty() {
            return Err(ChannelError::NoMessages { id });
        }
        Ok(Self {
            id,
            topic: topic.into(),
            messages,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The message that decides whether a reply is owed
    pub fn last_message(&self) -> &ChatMessage {
        // Non-empty by construction
        &self.messages[self.messages.len() - 1]
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Reply on this channel and acknowledge it.
    ///
    /// The channel is only marked read once the send succeeded; a failed send
    /// leaves it unread for the next poll.
    pub async fn respond(&self, transport: &dyn ChatTransport, text: &str) -> Result<()> {
        transport
            .send_channel_message(text, &self.id, &self.topic)
            .await?;
        transport.mark_as_read(self).await?;
        Ok(())
    }
}

impl PartialEq for Channel {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.topic == other.topic
    }
}

impl Eq for Channel {}

impl Hash for Channel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.topic.hash(state);
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Channel {} topic: {}", self.id, self.topic)?;
        for message in &self.messages {
            write!(f, "\n  {}", message)?;
        }
        Ok(())
    }
}
