// ABOUTME: Command backend - spawns an external program with the prompt as its last argument.
// ABOUTME: Trimmed stdout is the reply; a non-zero exit or a timeout is an error.

use crate::prompt;
use crate::registry::GeneratorFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use guanaco_core::ResponseGenerator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command as ProcessCommand;

/// Configuration for the command backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to run, looked up on PATH when not absolute
    pub binary: String,
    /// Arguments placed before the prompt
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub working_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    60
}

pub struct CommandGenerator {
    config: CommandConfig,
}

impl CommandGenerator {
    pub fn new(config: CommandConfig) -> Result<Self> {
        if config.binary.trim().is_empty() {
            anyhow::bail!("command generator needs a binary");
        }
        Ok(Self { config })
    }

    /// Factory function for the registry
    pub fn factory() -> GeneratorFactory {
        Box::new(|config: &Value| -> Result<Arc<dyn ResponseGenerator>> {
            let cfg: CommandConfig = serde_json::from_value(config.clone())?;
            Ok(Arc::new(CommandGenerator::new(cfg)?))
        })
    }
}

#[async_trait]
impl ResponseGenerator for CommandGenerator {
    async fn think(&self, prompt: &str) -> Result<String> {
        let prompt = prompt::clean(prompt);

        let mut command = ProcessCommand::new(&self.config.binary);
        command.args(&self.config.args).arg(&prompt).kill_on_drop(true);
        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        tracing::debug!(binary = %self.config.binary, args = ?self.config.args, "Spawning generator command");

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} timed out after {}s",
                    self.config.binary,
                    self.config.timeout_secs
                )
            })?
            .with_context(|| format!("Failed to spawn {}", self.config.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} exited with {}: {}",
                self.config.binary,
                output.status,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        "command"
    }
}
