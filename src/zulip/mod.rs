// ABOUTME: Zulip platform adapter: REST transport and message mapping

pub mod mapper;
mod transport;

pub use transport::{ZulipTransport, UNREAD_BATCH};

/// Platform name carried by every Zulip identity
pub const PLATFORM: &str = "zulip";
