mod timeouts;
mod twitch;

pub use timeouts::TimeoutConfig;
pub use twitch::TwitchConfig;
