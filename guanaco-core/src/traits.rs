// ABOUTME: Collaborator traits consumed by the core: transport, generator, agent directory
// ABOUTME: Adapters and test doubles implement the same traits

use crate::agent::Agent;
use crate::channel::Channel;
use crate::identity::Identity;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

// =============================================================================
// Chat Transport
// =============================================================================

/// Access to a chat platform on behalf of one agent.
///
/// Implementations report a non-success platform response as a
/// [`TransportError`](crate::error::TransportError) wrapped in the returned
/// `anyhow::Error`, so callers can recover the remote message.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Channels holding unread messages, keyed by a transport-defined key
    /// that is unique per channel/topic pair. Every channel carries at least
    /// the message that made it unread.
    async fn get_channels_with_unread(&self) -> Result<HashMap<String, Channel>>;

    /// Post `text` to a channel under the given topic
    async fn send_channel_message(&self, text: &str, channel_id: &str, topic: &str) -> Result<()>;

    /// Acknowledge every message in the channel
    async fn mark_as_read(&self, channel: &Channel) -> Result<()>;

    /// Send a direct message to a single user
    async fn send_private_message(&self, text: &str, recipient: &Identity) -> Result<()>;

    /// Reply inside a thread
    async fn send_thread_message(&self, text: &str, thread_id: &str, topic: &str) -> Result<()>;

    /// Platform identifier used in logs (e.g., "zulip")
    fn platform(&self) -> &str;
}

// =============================================================================
// Response Generator
// =============================================================================

/// Produces reply text for a prompt (typically a language model)
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn think(&self, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str {
        "generator"
    }
}

// =============================================================================
// Agent Directory
// =============================================================================

/// Source of the agents a supervisor should run.
///
/// Called once per supervisor run; each returned agent gets its own worker.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn get_agents(&self) -> Result<Vec<Agent>>;
}
