// ABOUTME: Platform-agnostic agent runtime for guanaco chat bots
// ABOUTME: Agents, per-agent workers, and the supervisor that runs them from a directory

pub mod agent;
pub mod channel;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod supervisor;
pub mod testing;
pub mod traits;
pub mod worker;

pub use agent::Agent;
pub use channel::{Channel, ChatMessage};
pub use error::{AgentError, Collaborator, TransportError, WorkerError};
pub use identity::Identity;
pub use supervisor::{Supervisor, SupervisorConfig};
pub use worker::Worker;

// Re-export collaborator traits for adapter crates
pub use traits::{AgentDirectory, ChatTransport, ResponseGenerator};
