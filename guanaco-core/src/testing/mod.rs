// ABOUTME: In-memory collaborators for deterministic agent, worker, and supervisor tests
// ABOUTME: Recording transport, scripted generator, closure-backed agent directory, and fixtures

mod directory;
mod generator;
mod transport;

pub use directory::StaticDirectory;
pub use generator::ScriptedGenerator;
pub use transport::{RecordingTransport, TransportCall};

use crate::channel::{Channel, ChatMessage};
use crate::identity::Identity;
use chrono::Utc;

/// Platform name used by the fixtures
pub const TEST_PLATFORM: &str = "test";

/// Identity on the test platform. Panics on an empty id.
pub fn identity(id: &str) -> Identity {
    Identity::new(id, TEST_PLATFORM).expect("test identity id must not be empty")
}

/// A message sent now by `sender` on the test platform
pub fn message(id: &str, content: &str, sender: &str) -> ChatMessage {
    ChatMessage::new(id, content, identity(sender), Utc::now())
}

/// A channel whose only (and therefore last) message is `content` from `sender`
pub fn channel(id: &str, topic: &str, content: &str, sender: &str) -> Channel {
    Channel::new(id, topic, vec![message(id, content, sender)])
        .expect("fixture channel always has a message")
}
