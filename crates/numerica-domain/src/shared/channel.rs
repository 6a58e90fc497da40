use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::DomainError;

/// A Twitch channel login, normalized to lowercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelName(String);

impl ChannelName {
    pub const MAX_LEN: usize = 25;

    pub fn new(name: &str) -> Result<Self, DomainError> {
        let name = name.trim().trim_start_matches('#');

        if name.is_empty() {
            return Err(DomainError::Validation(
                "Channel name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Channel name '{name}' is longer than {} characters",
                Self::MAX_LEN
            )));
        }

        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DomainError::Validation(format!(
                "Channel name '{name}' may only contain letters, digits and underscores"
            )));
        }

        Ok(Self(name.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// IRC form of the channel, e.g. `#rothiotome`
    pub fn irc_channel(&self) -> String {
        format!("#{}", self.0)
    }
}

impl FromStr for ChannelName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
