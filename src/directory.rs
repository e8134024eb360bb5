// ABOUTME: AgentDirectory that builds Zulip agents from configuration
// ABOUTME: Each agent gets its own transport and generator instances

use crate::config::{AgentSettings, Config};
use crate::zulip::{self, ZulipTransport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use guanaco_core::{Agent, AgentDirectory, Identity};
use guanaco_think::GeneratorRegistry;
use std::sync::Arc;

pub struct ConfigAgentDirectory {
    agents: Vec<AgentSettings>,
    registry: GeneratorRegistry,
}

impl ConfigAgentDirectory {
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config, GeneratorRegistry::default())
    }

    pub fn with_registry(config: &Config, registry: GeneratorRegistry) -> Self {
        Self {
            agents: config.agent_settings(),
            registry,
        }
    }

    pub fn agents(&self) -> &[AgentSettings] {
        &self.agents
    }

    /// Build every agent's generator without touching the network
    pub fn check_generators(&self) -> Result<()> {
        for settings in &self.agents {
            self.registry
                .create_from_config(&settings.generator)
                .with_context(|| format!("Agent '{}' has an invalid generator", settings.name))?;
        }
        Ok(())
    }

    async fn build_agent(&self, settings: &AgentSettings) -> Result<Agent> {
        let transport = Arc::new(ZulipTransport::new(&settings.zulip)?);

        let identity = match &settings.user_id {
            Some(user_id) => Identity::new(user_id.clone(), zulip::PLATFORM)?,
            None => transport
                .own_identity()
                .await
                .context("Failed to look up the bot's Zulip user id")?,
        };

        let generator = self
            .registry
            .create_from_config(&settings.generator)
            .context("Failed to create response generator")?;

        tracing::info!(
            agent = %settings.name,
            identity = %identity,
            site = %transport.site(),
            generator = %generator.name(),
            "Agent ready"
        );

        Ok(Agent::new()
            .with_name(settings.name.clone())
            .with_identity(identity)
            .with_transport(transport)
            .with_generator(generator))
    }
}

#[async_trait]
impl AgentDirectory for ConfigAgentDirectory {
    /// Build all configured agents.
    ///
    /// An agent that cannot be built is logged and left out; the lookup only
    /// fails when no agent could be built at all.
    async fn get_agents(&self) -> Result<Vec<Agent>> {
        let mut agents = Vec::with_capacity(self.agents.len());
        let mut last_error = None;

        for settings in &self.agents {
            match self.build_agent(settings).await {
                Ok(agent) => agents.push(agent),
                Err(e) => {
                    tracing::error!(agent = %settings.name, error = %format!("{:#}", e), "Skipping agent");
                    last_error = Some(e.context(format!("Agent '{}' could not be built", settings.name)));
                }
            }
        }

        match last_error {
            Some(e) if agents.is_empty() => Err(e),
            _ => Ok(agents),
        }
    }
}
