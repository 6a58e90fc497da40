use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::DomainError;

/// Storage key the best score lives under. Shared by every channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreNamespace(String);

impl ScoreNamespace {
    pub const DEFAULT: &'static str = "numerica";

    pub fn new(name: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::Validation(
                "Score namespace cannot be empty".to_string(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScoreNamespace {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl std::fmt::Display for ScoreNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Longest streak ever reached. `max_score` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    max_score: u64,
    updated_at: DateTime<Utc>,
}

impl BestScore {
    pub fn zero() -> Self {
        Self {
            max_score: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn restore(max_score: u64, updated_at: DateTime<Utc>) -> Self {
        Self {
            max_score,
            updated_at,
        }
    }

    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply `max_score = max(max_score, candidate)`.
    /// Returns true when the candidate set a new record.
    pub fn register(&mut self, candidate: u64) -> bool {
        if candidate <= self.max_score {
            return false;
        }
        self.max_score = candidate;
        self.updated_at = Utc::now();
        true
    }
}

impl Default for BestScore {
    fn default() -> Self {
        Self::zero()
    }
}
