use async_trait::async_trait;

use super::ChatMessage;
use crate::shared::{ChannelName, DomainError};

/// Source of chat messages for one channel (Strategy pattern).
///
/// Messages are delivered in arrival order to a single consumer. Callers
/// pair every `connect` with a `disconnect`, whatever the outcome.
#[async_trait]
pub trait ChatFeed: Send {
    /// Open the connection and join `channel`
    async fn connect(&mut self, channel: &ChannelName) -> Result<(), DomainError>;

    /// Next message, or `None` once the feed is closed
    async fn next_message(&mut self) -> Option<ChatMessage>;

    /// Leave the channel and release the connection
    async fn disconnect(&mut self) -> Result<(), DomainError>;
}
