// ABOUTME: AgentDirectory double that builds its agents from a closure on every call

use crate::agent::Agent;
use crate::traits::AgentDirectory;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

type AgentFactory = Box<dyn Fn() -> Result<Vec<Agent>> + Send + Sync>;

pub struct StaticDirectory {
    factory: AgentFactory,
    calls: AtomicUsize,
}

impl StaticDirectory {
    /// Directory returning whatever `build` produces
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> Vec<Agent> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(move || Ok(build())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new)
    }

    /// Directory whose lookup always fails
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self {
            factory: Box::new(move || Err(anyhow::anyhow!("{}", message))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentDirectory for StaticDirectory {
    async fn get_agents(&self) -> Result<Vec<Agent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.factory)()
    }
}
