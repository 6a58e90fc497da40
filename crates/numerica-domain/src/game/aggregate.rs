use serde::{Deserialize, Serialize};

use super::value_objects::{GameStatus, SubmittedNumber};

/// Why a submission left the game untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// Not a finite, strictly positive integer
    InvalidNumber,
    /// Same participant as the last accepted submission
    SameSender,
}

/// Outcome of feeding one submission to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Ignored(IgnoreReason),
    Advanced { count: u64 },
    Broken { broken_count: u64, status: GameStatus },
}

impl Transition {
    /// Whether the game state changed
    pub fn is_applied(&self) -> bool {
        !matches!(self, Transition::Ignored(_))
    }
}

/// Counting game state for one channel session.
///
/// Participants must alternate; a correct next number extends the streak and
/// anything else breaks it. The tracker performs no I/O: callers react to a
/// [`Transition::Broken`] by registering the broken length as a best-score
/// candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakTracker {
    status: GameStatus,
    count: u64,
    last_user: String,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder for restoring a known state
    pub fn restore(status: GameStatus, count: u64, last_user: impl Into<String>) -> Self {
        Self {
            status,
            count,
            last_user: last_user.into(),
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn last_user(&self) -> &str {
        &self.last_user
    }

    pub fn submit(&mut self, user: &str, raw_text: &str) -> Transition {
        let Some(number) = SubmittedNumber::parse(raw_text) else {
            return Transition::Ignored(IgnoreReason::InvalidNumber);
        };

        if user == self.last_user {
            return Transition::Ignored(IgnoreReason::SameSender);
        }

        if self.count.checked_add(1) == Some(number.value()) {
            self.status = GameStatus::Started;
            self.count = number.value();
            self.last_user = user.to_string();
            return Transition::Advanced { count: self.count };
        }

        let broken_count = self.count;
        self.status = if broken_count == 0 {
            GameStatus::Idle
        } else {
            GameStatus::GameOver
        };
        self.count = 0;
        self.last_user = user.to_string();

        Transition::Broken {
            broken_count,
            status: self.status,
        }
    }

    /// Snapshot for rendering, paired with the current best score
    pub fn scoreboard(&self, max_score: u64) -> Scoreboard {
        Scoreboard {
            status: self.status,
            count: self.count,
            last_user: self.last_user.clone(),
            max_score,
        }
    }
}

/// Read-only view of the game handed to renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub status: GameStatus,
    pub count: u64,
    pub last_user: String,
    pub max_score: u64,
}

impl Scoreboard {
    /// Status-dependent attribution line: the current contributor while a
    /// streak runs, blame on whoever broke it after a game over, nothing idle.
    pub fn attribution(&self) -> Option<String> {
        match self.status {
            GameStatus::Idle => None,
            GameStatus::Started => Some(self.last_user.clone()),
            GameStatus::GameOver => Some(format!("Blame on {}!", self.last_user)),
        }
    }
}
