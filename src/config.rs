// ABOUTME: Configuration parsing from TOML file with environment variable overrides
// ABOUTME: Validates Zulip credentials for every agent and names each missing value
use crate::paths;
use anyhow::{Context, Result};
use guanaco_core::SupervisorConfig;
use guanaco_think::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the single agent run when no `[[agents]]` are configured
pub const DEFAULT_AGENT_NAME: &str = "guanaco";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub zulip: ZulipConfig,
    #[serde(default)]
    pub supervisor: SupervisorSettings,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<AgentConfig>,
}

/// Shared Zulip connection settings; agents inherit anything they don't set
#[derive(Clone, Serialize, Deserialize)]
pub struct ZulipConfig {
    /// Server root, e.g. `https://chat.example.com`
    #[serde(default)]
    pub site: String,
    /// Bot email used for HTTP basic auth
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ZulipConfig {
    fn default() -> Self {
        Self {
            site: String::new(),
            email: String::new(),
            api_key: None,
            timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Custom Debug impl to redact the API key
impl std::fmt::Debug for ZulipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZulipConfig")
            .field("site", &self.site)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorSettings {
    /// Seconds between an agent's polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
    #[serde(default = "default_stop_timeout_secs")]
    pub stop_timeout_secs: u64,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            monitor_interval_ms: default_monitor_interval_ms(),
            stop_timeout_secs: default_stop_timeout_secs(),
        }
    }
}

impl SupervisorSettings {
    pub fn to_supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            monitor_interval: Duration::from_millis(self.monitor_interval_ms),
            stop_timeout: Duration::from_secs(self.stop_timeout_secs),
        }
    }
}

/// One `[[agents]]` entry
#[derive(Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    /// Zulip user id of the bot; looked up from the server when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Overrides the top-level `[generator]` for this agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<GeneratorConfig>,
}

// Custom Debug impl to redact the API key
impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("user_id", &self.user_id)
            .field("site", &self.site)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("generator", &self.generator)
            .finish()
    }
}

/// An agent with inherited settings filled in
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub name: String,
    pub user_id: Option<String>,
    pub zulip: ZulipConfig,
    pub generator: GeneratorConfig,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_monitor_interval_ms() -> u64 {
    1000
}

fn default_stop_timeout_secs() -> u64 {
    5
}

/// Environment variable value, treating an empty value as unset
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Find the config file, checking multiple locations in order:
    /// 1. GUANACO_CONFIG_PATH env var (if set)
    /// 2. ./config.toml (current directory - for development)
    /// 3. ~/.config/guanaco/config.toml (XDG config dir)
    fn find_config_file() -> Option<PathBuf> {
        if let Some(env_path) = env_var("GUANACO_CONFIG_PATH") {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!(path = %env_path, "GUANACO_CONFIG_PATH does not exist, ignoring");
        }

        let local_config = PathBuf::from("config.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        let xdg_config = paths::config_file();
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        None
    }

    /// Load configuration with environment overrides and validate it.
    ///
    /// An explicit `path` must exist; without one the standard locations are
    /// searched and a missing file means environment variables and defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(),
        };

        let mut config = match config_path {
            Some(config_path) => {
                tracing::info!(path = %config_path.display(), "Loading configuration from file");
                Self::from_file(&config_path)?
            }
            None => {
                tracing::info!("No config file found, using environment variables and defaults");
                Config::default()
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse TOML without applying environment overrides
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid configuration TOML")
    }

    /// Apply environment variables on top of file values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("ZULIP_API_KEY") {
            self.zulip.api_key = Some(val);
        }
        if let Some(val) = env_var("ZULIP_EMAIL") {
            self.zulip.email = val;
        }
        // ZULIP_API_URL wins over the older ZULIP_SITE name
        if let Some(val) = env_var("ZULIP_API_URL").or_else(|| env_var("ZULIP_SITE")) {
            self.zulip.site = val;
        }
        if let Some(val) = env_var("GUANACO_POLL_INTERVAL_SECS") {
            self.supervisor.poll_interval_secs = val.parse().with_context(|| {
                format!("GUANACO_POLL_INTERVAL_SECS must be a whole number of seconds, got: {}", val)
            })?;
        }
        if let Some(val) = env_var("GENERATOR_TYPE") {
            self.generator.generator_type = val;
        }
        Ok(())
    }

    /// Check every agent has a site, an email, and an API key.
    ///
    /// All missing values are reported together.
    pub fn validate(&self) -> Result<()> {
        if self.supervisor.poll_interval_secs == 0 {
            anyhow::bail!("supervisor.poll_interval_secs must be at least 1");
        }

        let mut missing = Vec::new();
        for agent in self.agent_settings() {
            let scope = if self.agents.is_empty() {
                String::new()
            } else {
                format!("agent '{}': ", agent.name)
            };
            if agent.zulip.site.trim().is_empty() {
                missing.push(format!("{}zulip.site (ZULIP_API_URL or ZULIP_SITE)", scope));
            }
            if agent.zulip.email.trim().is_empty() {
                missing.push(format!("{}zulip.email (ZULIP_EMAIL)", scope));
            }
            if agent.zulip.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                missing.push(format!("{}zulip.api_key (ZULIP_API_KEY)", scope));
            }
        }

        if !missing.is_empty() {
            anyhow::bail!(
                "Missing required Zulip settings: {}. Set them in config.toml, a .env file, or the environment.",
                missing.join(", ")
            );
        }
        Ok(())
    }

    /// Configured agents with inherited Zulip and generator settings.
    ///
    /// Without `[[agents]]` there is one agent named [`DEFAULT_AGENT_NAME`]
    /// using the top-level settings.
    pub fn agent_settings(&self) -> Vec<AgentSettings> {
        if self.agents.is_empty() {
            return vec![AgentSettings {
                name: DEFAULT_AGENT_NAME.to_string(),
                user_id: None,
                zulip: self.zulip.clone(),
                generator: self.generator.clone(),
            }];
        }

        self.agents
            .iter()
            .map(|agent| AgentSettings {
                name: agent.name.clone(),
                user_id: agent.user_id.clone(),
                zulip: ZulipConfig {
                    site: agent.site.clone().unwrap_or_else(|| self.zulip.site.clone()),
                    email: agent.email.clone().unwrap_or_else(|| self.zulip.email.clone()),
                    api_key: agent.api_key.clone().or_else(|| self.zulip.api_key.clone()),
                    timeout_secs: self.zulip.timeout_secs,
                },
                generator: agent
                    .generator
                    .clone()
                    .unwrap_or_else(|| self.generator.clone()),
            })
            .collect()
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        self.supervisor.to_supervisor_config()
    }
}
