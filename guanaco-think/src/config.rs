// ABOUTME: [generator] configuration section with a type discriminator.
// ABOUTME: Backend-specific fields stay in a flattened table handed to the registry as JSON.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Generator configuration with type discriminator
#[derive(Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Backend type: "canned", "command", "openai"
    #[serde(rename = "type")]
    pub generator_type: String,

    /// Reply used when the backend fails; failures propagate when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reply: Option<String>,

    /// Remaining fields passed to the backend factory
    #[serde(flatten)]
    pub config: toml::Table,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generator_type: "canned".to_string(),
            fallback_reply: None,
            config: toml::Table::new(),
        }
    }
}

// Backend tables may carry credentials (e.g. openai api_key)
impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<(&str, String)> = self
            .config
            .iter()
            .map(|(key, value)| {
                let shown = if is_secret_key(key) {
                    "[REDACTED]".to_string()
                } else {
                    value.to_string()
                };
                (key.as_str(), shown)
            })
            .collect();

        f.debug_struct("GeneratorConfig")
            .field("generator_type", &self.generator_type)
            .field("fallback_reply", &self.fallback_reply)
            .field("config", &fields)
            .finish()
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["key", "token", "secret", "password"]
        .iter()
        .any(|suffix| key.ends_with(suffix))
}

impl GeneratorConfig {
    pub fn new(generator_type: &str) -> Self {
        Self {
            generator_type: generator_type.to_string(),
            ..Self::default()
        }
    }

    /// Parse a standalone `[generator]` table
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse generator TOML")
    }

    pub fn generator_type(&self) -> &str {
        &self.generator_type
    }

    /// Backend fields as JSON for the registry
    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.config).context("Generator config is not representable as JSON")
    }
}
