mod feed;
mod message;

pub use feed::ChatFeed;
pub use message::ChatMessage;
