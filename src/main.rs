// ABOUTME: Entry point for the guanaco binary
// ABOUTME: Parses the CLI, loads .env and config, initializes logging, dispatches commands

use anyhow::Result;
use clap::{Parser, Subcommand};
use guanaco::config::Config;
use guanaco::logging::{self, LogOptions};
use guanaco::{app, paths};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guanaco")]
#[command(version, about = "Zulip agents that answer unread messages")]
struct Cli {
    /// Config file path (default: GUANACO_CONFIG_PATH, ./config.toml, then the XDG config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Also write daily rolling logs under the data directory
    #[arg(long, global = true)]
    log_file: bool,

    /// Log JSON lines instead of text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run all configured agents until interrupted (default)
    Run {
        /// Seconds between polls, overriding the config
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// List configured agents
    Agents,
    /// Validate configuration and exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = logging::init(&LogOptions {
        json: cli.log_json,
        file_dir: cli.log_file.then(paths::log_dir),
    })?;

    let command = cli.command.unwrap_or(Command::Run { interval: None });
    let mut config = Config::load(cli.config.as_deref())?;

    match command {
        Command::Run { interval } => {
            if let Some(secs) = interval {
                config.supervisor.poll_interval_secs = secs;
                config.validate()?;
            }
            app::run(&config).await
        }
        Command::Agents => {
            for line in app::describe_agents(&config) {
                println!("{}", line);
            }
            Ok(())
        }
        Command::CheckConfig => {
            let count = app::check_config(&config)?;
            println!("Configuration OK: {} agent(s)", count);
            Ok(())
        }
    }
}
