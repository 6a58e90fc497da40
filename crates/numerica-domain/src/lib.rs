// Domain layer - Pure game rules
// No dependencies on infrastructure or presentation layers

pub mod best_score;
pub mod chat;
pub mod game;
pub mod shared;

// Re-exports for convenience
pub use shared::{ChannelName, DomainError, SessionId};
