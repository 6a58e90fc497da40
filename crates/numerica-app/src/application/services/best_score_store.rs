use std::sync::Arc;
use tracing::{debug, error, info};

use numerica_domain::best_score::{BestScore, BestScoreRepository, ScoreNamespace};
use numerica_domain::shared::DomainError;

/// Cached best score backed by a repository.
///
/// Every registration is written through. A failed write is logged and the
/// cached value is kept so play can continue.
pub struct BestScoreStore {
    repo: Arc<dyn BestScoreRepository>,
    namespace: ScoreNamespace,
    current: BestScore,
}

impl BestScoreStore {
    pub async fn load(
        repo: Arc<dyn BestScoreRepository>,
        namespace: ScoreNamespace,
    ) -> Result<Self, DomainError> {
        let current = repo.get(&namespace).await?;
        info!(
            "Loaded best score {} for namespace '{}'",
            current.max_score(),
            namespace
        );

        Ok(Self {
            repo,
            namespace,
            current,
        })
    }

    pub fn max_score(&self) -> u64 {
        self.current.max_score()
    }

    pub fn namespace(&self) -> &ScoreNamespace {
        &self.namespace
    }

    /// Returns true when `candidate` beat the previous record
    pub async fn register_new_score(&mut self, candidate: u64) -> bool {
        let improved = self.current.register(candidate);

        if let Err(e) = self.repo.set(&self.namespace, &self.current).await {
            error!(
                "Failed to persist best score {}: {}",
                self.current.max_score(),
                e.format_with_code()
            );
        }

        if improved {
            info!("New best score: {}", candidate);
        } else {
            debug!(
                "Score {} did not beat best score {}",
                candidate,
                self.current.max_score()
            );
        }

        improved
    }
}
