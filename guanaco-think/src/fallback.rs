// ABOUTME: Wrapper that answers with a fixed reply when the wrapped generator fails

use anyhow::Result;
use async_trait::async_trait;
use guanaco_core::ResponseGenerator;
use std::sync::Arc;

/// Turns generator failures into a fixed reply, logging the failure.
///
/// Without this wrapper a generator failure ends the agent's worker.
pub struct FallbackGenerator {
    inner: Arc<dyn ResponseGenerator>,
    reply: String,
}

impl FallbackGenerator {
    pub fn new(inner: Arc<dyn ResponseGenerator>, reply: impl Into<String>) -> Self {
        Self {
            inner,
            reply: reply.into(),
        }
    }

    pub fn reply(&self) -> &str {
        &self.reply
    }
}

#[async_trait]
impl ResponseGenerator for FallbackGenerator {
    async fn think(&self, prompt: &str) -> Result<String> {
        match self.inner.think(prompt).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                tracing::warn!(
                    generator = %self.inner.name(),
                    error = %e,
                    "Generator failed, using fallback reply"
                );
                Ok(self.reply.clone())
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
