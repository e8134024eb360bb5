// ABOUTME: ResponseGenerator double with scripted replies, failure injection, and call tracking
// ABOUTME: Tracks peak concurrent calls so tests can observe parallel workers

use crate::traits::ResponseGenerator;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Generator double for tests.
///
/// Replies with the scripted answer for a prompt when there is one and with
/// the default reply otherwise.
pub struct ScriptedGenerator {
    default_reply: String,
    responses: HashMap<String, String>,
    failure: Option<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedGenerator {
    /// Answer every prompt with `reply`
    pub fn new(reply: &str) -> Self {
        Self {
            default_reply: reply.to_string(),
            responses: HashMap::new(),
            failure: None,
            delay: None,
            prompts: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fail every call with `message`
    pub fn failing(message: &str) -> Self {
        let mut generator = Self::new("");
        generator.failure = Some(message.to_string());
        generator
    }

    pub fn with_response(mut self, prompt: &str, reply: &str) -> Self {
        self.responses.insert(prompt.to_string(), reply.to_string());
        self
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Most calls observed running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    async fn think(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }

        Ok(self
            .responses
            .get(prompt)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
