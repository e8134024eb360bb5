// ABOUTME: Response generator backends for guanaco agents.
// ABOUTME: Canned, external command, and OpenAI-compatible HTTP backends behind one registry.

pub mod backends;
pub mod config;
pub mod fallback;
pub mod prompt;
pub mod registry;

pub use config::GeneratorConfig;
pub use fallback::FallbackGenerator;
pub use registry::{GeneratorFactory, GeneratorRegistry};
