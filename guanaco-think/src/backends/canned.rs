// ABOUTME: Canned backend - answers from a fixed prompt table with a default reply.
// ABOUTME: Useful for smoke-testing a deployment without a model.

use crate::prompt;
use crate::registry::GeneratorFactory;
use anyhow::Result;
use async_trait::async_trait;
use guanaco_core::ResponseGenerator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for the canned backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedConfig {
    /// Reply for prompts without an entry in `responses`
    #[serde(default = "default_reply")]
    pub reply: String,
    /// Exact cleaned prompt -> reply
    #[serde(default)]
    pub responses: HashMap<String, String>,
}

fn default_reply() -> String {
    "Hello!".to_string()
}

impl Default for CannedConfig {
    fn default() -> Self {
        Self {
            reply: default_reply(),
            responses: HashMap::new(),
        }
    }
}

pub struct CannedGenerator {
    config: CannedConfig,
}

impl CannedGenerator {
    pub fn new(config: CannedConfig) -> Self {
        Self { config }
    }

    /// Factory function for the registry
    pub fn factory() -> GeneratorFactory {
        Box::new(|config: &Value| -> Result<Arc<dyn ResponseGenerator>> {
            let cfg: CannedConfig = serde_json::from_value(config.clone())?;
            Ok(Arc::new(CannedGenerator::new(cfg)))
        })
    }
}

#[async_trait]
impl ResponseGenerator for CannedGenerator {
    async fn think(&self, prompt: &str) -> Result<String> {
        let prompt = prompt::clean(prompt);
        Ok(self
            .config
            .responses
            .get(&prompt)
            .unwrap_or(&self.config.reply)
            .clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}
