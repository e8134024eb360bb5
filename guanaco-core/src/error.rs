// ABOUTME: Error taxonomy for agents, workers, and the chat entities they operate on.
// ABOUTME: Typed errors at the core boundary; collaborator failures travel as anyhow sources.

use std::fmt;
use thiserror::Error;

/// Which collaborator an agent was missing when asked to work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Transport,
    Generator,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Transport => f.write_str("chat transport"),
            Collaborator::Generator => f.write_str("response generator"),
        }
    }
}

/// Failures of a single `Agent::work()` call.
///
/// Every variant is fatal to the cycle that raised it. The worker running the
/// agent logs it and stops; nothing here is retried.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("cannot work without an identity")]
    MissingIdentity,

    #[error("cannot work without a {0}")]
    MissingCollaborator(Collaborator),

    #[error("transport failure: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("response generator failure: {0:#}")]
    Generator(#[source] anyhow::Error),
}

impl AgentError {
    /// The remote platform error behind a transport failure, if there is one
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            AgentError::Transport(e) => e.downcast_ref::<TransportError>(),
            _ => None,
        }
    }
}

/// A chat platform call that came back with a non-success response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{platform} API error: {message}")]
pub struct TransportError {
    pub platform: String,
    pub message: String,
}

impl TransportError {
    pub fn new(platform: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            message: message.into(),
        }
    }
}

/// Misuse of the worker lifecycle API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("worker for {agent} is already running")]
    AlreadyRunning { agent: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("identity {field} must not be empty")]
    Empty { field: &'static str },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel {id} has no messages")]
    NoMessages { id: String },
}
