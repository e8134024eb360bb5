// ABOUTME: OpenAI-compatible backend - posts the prompt to a /chat/completions endpoint.
// ABOUTME: Targets local inference servers (vLLM, llama.cpp, Ollama) serving a small chat model.

use crate::prompt;
use crate::registry::GeneratorFactory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use guanaco_core::ResponseGenerator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "Qwen/Qwen3-1.7B";
pub const DEFAULT_MAX_TOKENS: u32 = 32;

/// Configuration for the OpenAI-compatible backend
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API root, e.g. `http://localhost:8000/v1`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub api_key: Option<String>,
    pub system_prompt: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_secs() -> u64 {
    60
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("system_prompt", &self.system_prompt)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatTurn<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiGenerator {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Factory function for the registry
    pub fn factory() -> GeneratorFactory {
        Box::new(|config: &Value| -> Result<Arc<dyn ResponseGenerator>> {
            let cfg: OpenAiConfig = serde_json::from_value(config.clone())?;
            Ok(Arc::new(OpenAiGenerator::new(cfg)?))
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }
}

#[async_trait]
impl ResponseGenerator for OpenAiGenerator {
    async fn think(&self, prompt: &str) -> Result<String> {
        let prompt = prompt::clean(prompt);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.config.system_prompt {
            messages.push(ChatTurn {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatTurn {
            role: "user",
            content: &prompt,
        });

        let body = ChatRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Completion request failed: {} {}", status, text.trim());
        }

        let completion: ChatResponse = response
            .json()
            .await
            .context("Malformed completion response")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Completion response has no choices")?;

        Ok(content.trim().to_string())
    }

    fn name(&self) -> &str {
        "openai"
    }
}
