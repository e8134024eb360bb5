// ABOUTME: Registry pattern for runtime generator selection.
// ABOUTME: Backends register factories; agents get generators by type name from config.

use crate::backends::{CannedGenerator, CommandGenerator, OpenAiGenerator};
use crate::config::GeneratorConfig;
use crate::fallback::FallbackGenerator;
use anyhow::{anyhow, Result};
use guanaco_core::ResponseGenerator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory function that creates a generator from backend config
pub type GeneratorFactory =
    Box<dyn Fn(&Value) -> Result<Arc<dyn ResponseGenerator>> + Send + Sync>;

/// Registry for runtime generator selection
pub struct GeneratorRegistry {
    factories: HashMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a generator factory by name
    pub fn register<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&Value) -> Result<Arc<dyn ResponseGenerator>> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
        self
    }

    /// Create a generator by name with the given config
    pub fn create(&self, name: &str, config: &Value) -> Result<Arc<dyn ResponseGenerator>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            anyhow!(
                "Unknown generator type: {} (available: {})",
                name,
                self.available().join(", ")
            )
        })?;
        factory(config)
    }

    /// List available generator names, sorted
    pub fn available(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Create a generator from a `[generator]` section, wrapping it with the
    /// fallback reply when one is configured
    pub fn create_from_config(&self, config: &GeneratorConfig) -> Result<Arc<dyn ResponseGenerator>> {
        let json_config = config.to_json_value()?;
        let generator = self.create(config.generator_type(), &json_config)?;

        Ok(match &config.fallback_reply {
            Some(reply) => Arc::new(FallbackGenerator::new(generator, reply.clone())),
            None => generator,
        })
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
            .register("canned", CannedGenerator::factory())
            .register("command", CommandGenerator::factory())
            .register("openai", OpenAiGenerator::factory())
    }
}
