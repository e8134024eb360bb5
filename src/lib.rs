// ABOUTME: Root library for the guanaco binary
// ABOUTME: Config, Zulip adapter, config-driven agent directory, logging, and signal handling

pub mod app;
pub mod config;
pub mod directory;
pub mod logging;
pub mod paths;
pub mod signals;
pub mod zulip;

// Re-export the runtime and generator crates for convenience
pub use guanaco_core::{Agent, Supervisor, SupervisorConfig};
pub use guanaco_think::{GeneratorConfig, GeneratorRegistry};
