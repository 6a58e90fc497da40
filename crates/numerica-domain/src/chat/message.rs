use serde::{Deserialize, Serialize};

/// A chat line already attributed to its sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name, or login when no display name was sent
    pub sender: String,
    pub text: String,
    /// Sent by the listening client itself
    pub is_self: bool,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            is_self: false,
        }
    }

    pub fn from_self(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            is_self: true,
            ..Self::new(sender, text)
        }
    }
}
