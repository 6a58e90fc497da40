mod aggregate;
mod value_objects;


pub use aggregate::{IgnoreReason, Scoreboard, StreakTracker, Transition};
pub use value_objects::{GameStatus, SubmittedNumber};
