// ABOUTME: Worker that runs one agent's work cycle on its own task until stopped
// ABOUTME: Agent failures end only this worker's loop; stop waits a bounded time for the task

use crate::agent::Agent;
use crate::error::WorkerError;
use crate::metrics;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Time between work cycles when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// How long `stop()` waits for the loop to exit before giving up on it
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Gives one agent an independent, repeating, cancellable run loop.
///
/// ```text
/// Idle --start()--> Running --stop()--> Stopping --(task exits or timeout)--> Idle
///                      \--agent error--> task ends, is_running() == false
/// ```
///
/// Cancellation is cooperative: a `work()` call in flight always finishes, and
/// the stop request is observed before the next cycle or during the wait
/// between cycles.
pub struct Worker {
    name: String,
    agent: Arc<Agent>,
    interval: Duration,
    stop_timeout: Duration,
    run: Option<RunningTask>,
    cycles: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl Worker {
    pub fn new(agent: Agent, interval: Duration) -> Self {
        Self {
            name: agent.label().to_string(),
            agent: Arc::new(agent),
            interval,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
            run: None,
            cycles: Arc::new(AtomicU64::new(0)),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Override the name used for logs and registry lookups
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of `work()` calls that completed successfully
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// The error that ended the loop, if it ended on one
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Spawn the run loop on the current tokio runtime.
    ///
    /// A worker whose loop already ended (for example after an agent failure)
    /// may be started again.
    pub fn start(&mut self) -> Result<(), WorkerError> {
        if self.is_running() {
            return Err(WorkerError::AlreadyRunning {
                agent: self.name.clone(),
            });
        }

        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = None;

        let cancel = CancellationToken::new();
        let span = tracing::info_span!("worker", name = %self.name);
        let handle = tokio::spawn(
            run_loop(
                self.name.clone(),
                Arc::clone(&self.agent),
                self.interval,
                cancel.clone(),
                Arc::clone(&self.cycles),
                Arc::clone(&self.last_error),
            )
            .instrument(span),
        );

        self.run = Some(RunningTask { cancel, handle });

        tracing::info!(
            worker = %self.name,
            interval_ms = self.interval.as_millis() as u64,
            "Worker started"
        );
        Ok(())
    }

    /// Started, not stopped, and the loop task is still alive
    pub fn is_running(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|run| !run.handle.is_finished())
    }

    /// Ask the loop to stop and wait up to the stop timeout for it to exit.
    ///
    /// Returns once the task has exited or the timeout elapsed; a task that
    /// outlives the timeout is detached and exits at its next checkpoint.
    /// Calling this on an idle worker does nothing.
    pub async fn stop(&mut self) {
        let Some(RunningTask { cancel, mut handle }) = self.run.take() else {
            return;
        };

        cancel.cancel();

        match tokio::time::timeout(self.stop_timeout, &mut handle).await {
            Ok(Ok(())) => {
                tracing::info!(worker = %self.name, cycles = self.cycles(), "Worker stopped");
            }
            Ok(Err(e)) if e.is_panic() => {
                tracing::error!(worker = %self.name, error = %e, "Worker task panicked");
                *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) =
                    Some(format!("worker task panicked: {}", e));
            }
            Ok(Err(e)) => {
                tracing::warn!(worker = %self.name, error = %e, "Worker task was cancelled");
            }
            Err(_) => {
                tracing::warn!(
                    worker = %self.name,
                    timeout_ms = self.stop_timeout.as_millis() as u64,
                    "Worker did not stop in time, detaching"
                );
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(run) = &self.run {
            run.cancel.cancel();
        }
    }
}

async fn run_loop(
    name: String,
    agent: Arc<Agent>,
    interval: Duration,
    cancel: CancellationToken,
    cycles: Arc<AtomicU64>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    while !cancel.is_cancelled() {
        match agent.work().await {
            Ok(replied) => {
                cycles.fetch_add(1, Ordering::Relaxed);
                metrics::record_work_cycle(&name);
                tracing::debug!(worker = %name, replied, "Work cycle finished");
            }
            Err(e) => {
                tracing::error!(worker = %name, error = %e, "Agent failed, worker stopping");
                metrics::record_worker_failure(&name);
                *last_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(e.to_string());
                return;
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::debug!(worker = %name, "Worker loop exited");
}
