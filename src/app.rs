// ABOUTME: Command implementations behind the guanaco binary
// ABOUTME: run wires config -> directory -> supervisor and hooks OS signals to shutdown

use crate::config::Config;
use crate::directory::ConfigAgentDirectory;
use crate::signals;
use anyhow::Result;
use guanaco_core::Supervisor;
use std::sync::Arc;

/// Run every configured agent until SIGINT/SIGTERM or until all workers stop
pub async fn run(config: &Config) -> Result<()> {
    let directory = Arc::new(ConfigAgentDirectory::new(config));
    let supervisor = Supervisor::new(directory, config.supervisor_config());

    tracing::info!(
        agents = config.agent_settings().len(),
        poll_interval_secs = config.supervisor.poll_interval_secs,
        "Starting guanaco"
    );

    let shim = signals::spawn_shutdown_on_signal(supervisor.shutdown_token());
    let result = supervisor.run().await;
    shim.abort();

    tracing::info!("guanaco stopped");
    result
}

/// One line per configured agent
pub fn describe_agents(config: &Config) -> Vec<String> {
    config
        .agent_settings()
        .iter()
        .map(|agent| {
            format!(
                "{}  site={}  email={}  user_id={}  generator={}",
                agent.name,
                agent.zulip.site,
                agent.zulip.email,
                agent.user_id.as_deref().unwrap_or("(from server)"),
                agent.generator.generator_type()
            )
        })
        .collect()
}

/// Validate configuration and generator settings without contacting Zulip
pub fn check_config(config: &Config) -> Result<usize> {
    let directory = ConfigAgentDirectory::new(config);
    directory.check_generators()?;
    Ok(directory.agents().len())
}
