pub mod irc;
mod twitch_feed;

pub use irc::IrcMessage;
pub use twitch_feed::{to_chat_message, TwitchChatFeed};
