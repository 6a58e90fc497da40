use async_trait::async_trait;

use super::{BestScore, ScoreNamespace};
use crate::shared::DomainError;

/// Persistence port for the best streak ever reached
#[async_trait]
pub trait BestScoreRepository: Send + Sync {
    /// Get the record stored under `namespace`, or a zero score if none exists
    async fn get(&self, namespace: &ScoreNamespace) -> Result<BestScore, DomainError>;

    /// Store the record under `namespace`, replacing any previous one
    async fn set(&self, namespace: &ScoreNamespace, score: &BestScore) -> Result<(), DomainError>;
}
