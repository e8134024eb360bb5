// ABOUTME: Generator backend implementations (canned, command, openai).
// ABOUTME: Each backend implements ResponseGenerator and exposes a registry factory.

pub mod canned;
pub mod command;
pub mod openai;

pub use canned::{CannedConfig, CannedGenerator};
pub use command::{CommandConfig, CommandGenerator};
pub use openai::{OpenAiConfig, OpenAiGenerator};
