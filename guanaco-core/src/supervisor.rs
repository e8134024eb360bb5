// ABOUTME: Supervisor ("spits" coordinator) that runs one worker per agent from a directory
// ABOUTME: Blocks until stop, the shutdown trigger, or every worker has stopped, then stops them all

use crate::agent::Agent;
use crate::traits::AgentDirectory;
use crate::worker::{Worker, DEFAULT_POLL_INTERVAL, DEFAULT_STOP_TIMEOUT};
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Timing knobs for a supervisor and the workers it starts
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Wait between an agent's work cycles
    pub poll_interval: Duration,
    /// How often the supervisor checks whether any worker is still alive
    pub monitor_interval: Duration,
    /// Bound on each worker's stop
    pub stop_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            monitor_interval: Duration::from_secs(1),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

impl SupervisorConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Runs every agent from an [`AgentDirectory`] on its own [`Worker`].
///
/// Workers are isolated from each other: an agent that fails stops only its
/// own worker, and the supervisor notices that only through liveness. Nothing
/// is restarted. `run()` returns once a stop was requested (via [`stop`],
/// or the token from [`shutdown_token`]) or once no worker is left running.
///
/// The supervisor installs no OS signal handlers; callers that want
/// SIGINT/SIGTERM handling cancel the shutdown token from their own handler.
///
/// [`stop`]: Supervisor::stop
/// [`shutdown_token`]: Supervisor::shutdown_token
pub struct Supervisor {
    directory: Arc<dyn AgentDirectory>,
    config: SupervisorConfig,
    workers: Mutex<HashMap<String, Worker>>,
    shutdown: CancellationToken,
}

impl Supervisor {
    pub fn new(directory: Arc<dyn AgentDirectory>, config: SupervisorConfig) -> Self {
        Self {
            directory,
            config,
            workers: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Token that ends `run()` when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Request shutdown; `run()` stops all workers and returns
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("Supervisor shutdown requested");
        }
        self.shutdown.cancel();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Start a worker per agent and block until shutdown.
    ///
    /// An empty directory is not an error: the call logs and returns.
    pub async fn run(&self) -> Result<()> {
        let agents = self
            .directory
            .get_agents()
            .await
            .context("Failed to load agents from directory")?;

        if agents.is_empty() {
            tracing::warn!("No agents found in directory");
            return Ok(());
        }

        tracing::info!(count = agents.len(), "Starting agent workers");
        self.start_workers(agents);

        self.wait_for_shutdown().await;
        self.stop_workers().await;
        Ok(())
    }

    /// Names of workers whose loop is alive, sorted
    pub fn get_running_workers(&self) -> Vec<String> {
        let mut running: Vec<String> = self
            .lock_workers()
            .iter()
            .filter(|(_, worker)| worker.is_running())
            .map(|(name, _)| name.clone())
            .collect();
        running.sort();
        running
    }

    pub fn is_worker_running(&self, name: &str) -> bool {
        self.lock_workers()
            .get(name)
            .is_some_and(|worker| worker.is_running())
    }

    /// The error that ended a worker's loop, while it is still registered
    pub fn worker_error(&self, name: &str) -> Option<String> {
        self.lock_workers()
            .get(name)
            .and_then(|worker| worker.last_error())
    }

    /// Registered workers, running or not
    pub fn worker_count(&self) -> usize {
        self.lock_workers().len()
    }

    fn lock_workers(&self) -> MutexGuard<'_, HashMap<String, Worker>> {
        self.workers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn start_workers(&self, agents: Vec<Agent>) {
        let mut workers = self.lock_workers();

        // Generated keys must not collide with a name any agent in this batch carries
        let mut reserved: HashSet<String> = agents
            .iter()
            .filter_map(explicit_name)
            .map(str::to_string)
            .collect();

        for agent in agents {
            let key = match explicit_name(&agent) {
                Some(name) => name.to_string(),
                None => {
                    let key = fallback_key(&workers, &reserved);
                    reserved.insert(key.clone());
                    key
                }
            };

            if workers.contains_key(&key) {
                tracing::warn!(worker = %key, "Worker already exists, skipping duplicate agent");
                continue;
            }

            let mut worker = Worker::new(agent, self.config.poll_interval)
                .with_name(key.clone())
                .with_stop_timeout(self.config.stop_timeout);

            if let Err(e) = worker.start() {
                tracing::error!(worker = %key, error = %e, "Failed to start worker");
                continue;
            }
            workers.insert(key, worker);
        }

        let running = workers.values().filter(|w| w.is_running()).count();
        tracing::info!(running, "Agent workers started");
    }

    async fn wait_for_shutdown(&self) {
        loop {
            if self.shutdown.is_cancelled() {
                tracing::info!("Shutdown requested, stopping workers");
                return;
            }

            let running = self
                .lock_workers()
                .values()
                .filter(|w| w.is_running())
                .count();
            if running == 0 {
                tracing::info!("All workers stopped, shutting down");
                return;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {}
                _ = tokio::time::sleep(self.config.monitor_interval) => {}
            }
        }
    }

    async fn stop_workers(&self) {
        let mut workers: Vec<(String, Worker)> = self.lock_workers().drain().collect();
        if workers.is_empty() {
            return;
        }

        tracing::info!(count = workers.len(), "Stopping agent workers");

        futures_util::future::join_all(workers.iter_mut().map(|(_, worker)| worker.stop())).await;

        for (name, worker) in &workers {
            if let Some(error) = worker.last_error() {
                tracing::warn!(worker = %name, error = %error, "Worker had stopped on error");
            }
        }

        tracing::info!("All agent workers stopped");
    }
}

fn explicit_name(agent: &Agent) -> Option<&str> {
    agent.name().filter(|name| !name.trim().is_empty())
}

/// First `agent_<n>` key neither registered nor reserved, starting at the registry size
fn fallback_key(workers: &HashMap<String, Worker>, reserved: &HashSet<String>) -> String {
    let mut index = workers.len();
    loop {
        let key = format!("agent_{}", index);
        if !workers.contains_key(&key) && !reserved.contains(&key) {
            return key;
        }
        index += 1;
    }
}
