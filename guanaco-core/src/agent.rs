// ABOUTME: Agent entity: an identity paired with a chat transport and a response generator
// ABOUTME: One work cycle reads unread channels, replies where owed, and acknowledges them

use crate::error::{AgentError, Collaborator};
use crate::identity::Identity;
use crate::metrics;
use crate::traits::{ChatTransport, ResponseGenerator};
use std::fmt;
use std::sync::Arc;

/// Name used in logs and worker names for agents without one
pub const UNNAMED_AGENT: &str = "unnamed";

/// A configured chat identity that can perform one unit of work.
///
/// Every part is optional so agents can be assembled step by step, but
/// [`Agent::work`] refuses to run without an identity, a transport, and a
/// generator.
#[derive(Default)]
pub struct Agent {
    name: Option<String>,
    identity: Option<Identity>,
    transport: Option<Arc<dyn ChatTransport>>,
    generator: Option<Arc<dyn ResponseGenerator>>,
}

impl Agent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ResponseGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Name for logs, falling back to [`UNNAMED_AGENT`]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_AGENT)
    }

    /// Process unread channels once.
    ///
    /// Returns `true` when at least one reply was sent. The agent never answers
    /// a channel whose last message it wrote itself. The first transport or
    /// generator failure aborts the rest of the cycle.
    pub async fn work(&self) -> Result<bool, AgentError> {
        let identity = self.identity.as_ref().ok_or(AgentError::MissingIdentity)?;
        let transport = self
            .transport
            .as_deref()
            .ok_or(AgentError::MissingCollaborator(Collaborator::Transport))?;
        let generator = self
            .generator
            .as_deref()
            .ok_or(AgentError::MissingCollaborator(Collaborator::Generator))?;

        let agent = self.label();
        let channels = transport
            .get_channels_with_unread()
            .await
            .map_err(AgentError::Transport)?;

        tracing::debug!(
            agent = %agent,
            platform = %transport.platform(),
            channels = channels.len(),
            "Fetched channels with unread messages"
        );

        let mut replied = false;

        for channel in channels.values() {
            let last = channel.last_message();

            if &last.sender == identity {
                tracing::debug!(
                    agent = %agent,
                    channel_id = %channel.id(),
                    topic = %channel.topic(),
                    "Last message is our own, skipping"
                );
                metrics::record_channel_skipped(agent);
                continue;
            }

            let reply = generator
                .think(&last.content)
                .await
                .map_err(AgentError::Generator)?;

            channel
                .respond(transport, &reply)
                .await
                .map_err(AgentError::Transport)?;

            tracing::info!(
                agent = %agent,
                channel_id = %channel.id(),
                topic = %channel.topic(),
                sender = %last.sender,
                generator = %generator.name(),
                reply_len = reply.len(),
                "Replied to channel"
            );
            metrics::record_reply_sent(agent);
            replied = true;
        }

        Ok(replied)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field("transport", &self.transport.as_ref().map(|t| t.platform().to_string()))
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .finish()
    }
}
