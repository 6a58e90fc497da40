use std::fmt;

use numerica_domain::shared::{ChannelName, DomainError};

/// What the CLI argument selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Channel(ChannelName),
}

impl Route {
    /// Accepts `/`, `/name`, `name` and a trailing slash. Empty input is home.
    pub fn parse(path: &str) -> Result<Self, DomainError> {
        let trimmed = path.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);

        if trimmed.is_empty() {
            return Ok(Route::Home);
        }
        if trimmed.contains('/') {
            return Err(DomainError::NotFound(format!("No page at '{}'", path.trim())));
        }

        ChannelName::new(trimmed).map(Route::Channel)
    }

    pub fn channel_path(channel: &str) -> String {
        format!("/{channel}")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Channel(channel) => write!(f, "{}", Self::channel_path(channel.as_str())),
        }
    }
}
