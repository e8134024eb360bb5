// ABOUTME: Platform identity of a chat participant (agent or human)
// ABOUTME: Equality is structural over (platform_id, platform_name); display names are cosmetic

use crate::error::IdentityError;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a user on a chat platform.
///
/// Two identities are the same participant when both the platform-assigned id
/// and the platform name match. The display name is carried for logging only.
#[derive(Debug, Clone)]
pub struct Identity {
    platform_id: String,
    platform_name: String,
    display_name: Option<String>,
}

impl Identity {
    pub fn new(
        platform_id: impl Into<String>,
        platform_name: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let platform_id = platform_id.into();
        let platform_name = platform_name.into();

        if platform_id.trim().is_empty() {
            return Err(IdentityError::Empty {
                field: "platform_id",
            });
        }
        if platform_name.trim().is_empty() {
            return Err(IdentityError::Empty {
                field: "platform_name",
            });
        }

        Ok(Self {
            platform_id,
            platform_name,
            display_name: None,
        })
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    pub fn platform_name(&self) -> &str {
        &self.platform_name
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.platform_id == other.platform_id && self.platform_name == other.platform_name
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.platform_id.hash(state);
        self.platform_name.hash(state);
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({}:{})", name, self.platform_name, self.platform_id),
            None => write!(f, "{}:{}", self.platform_name, self.platform_id),
        }
    }
}
