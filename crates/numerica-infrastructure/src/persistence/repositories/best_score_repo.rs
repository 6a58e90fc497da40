use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use numerica_domain::best_score::{BestScore, BestScoreRepository, ScoreNamespace};
use numerica_domain::shared::DomainError;

use crate::persistence::result_ext::ResultExt;

/// Parse datetime string, supporting both SQLite's '2025-12-20 12:34:56' and ISO 8601 '2025-12-20T12:34:56Z'
fn parse_datetime_flexible(datetime_str: &str) -> Result<DateTime<Utc>, DomainError> {
    if let Ok(dt) = datetime_str.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }

    let iso_format = datetime_str.replace(' ', "T") + "Z";
    iso_format
        .parse::<DateTime<Utc>>()
        .map_err(|e| DomainError::Repository(format!("Invalid datetime format: {}", e)))
}

/// SQLite implementation of BestScoreRepository
pub struct SqliteBestScoreRepository {
    pool: Arc<SqlitePool>,
}

impl SqliteBestScoreRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BestScoreRepository for SqliteBestScoreRepository {
    async fn get(&self, namespace: &ScoreNamespace) -> Result<BestScore, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT max_score, updated_at
            FROM best_scores
            WHERE namespace = ?
            "#,
        )
        .bind(namespace.as_str())
        .fetch_optional(self.pool.as_ref())
        .await
        .map_repo_error("Failed to load best score")?;

        let Some(row) = row else {
            return Ok(BestScore::zero());
        };

        let max_score: i64 = row.get("max_score");
        let updated_at: String = row.get("updated_at");

        let max_score = u64::try_from(max_score).map_err(|_| {
            DomainError::Repository(format!("Negative best score stored: {}", max_score))
        })?;

        Ok(BestScore::restore(
            max_score,
            parse_datetime_flexible(&updated_at)?,
        ))
    }

    async fn set(&self, namespace: &ScoreNamespace, score: &BestScore) -> Result<(), DomainError> {
        let max_score = i64::try_from(score.max_score()).map_err(|_| {
            DomainError::Repository(format!("Best score too large: {}", score.max_score()))
        })?;

        // MAX() keeps the stored value monotonic when sessions share the file
        sqlx::query(
            r#"
            INSERT INTO best_scores (namespace, max_score, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(namespace) DO UPDATE SET
                max_score = MAX(best_scores.max_score, excluded.max_score),
                updated_at = excluded.updated_at
            "#,
        )
        .bind(namespace.as_str())
        .bind(max_score)
        .bind(score.updated_at().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .execute(self.pool.as_ref())
        .await
        .map_repo_error("Failed to save best score")?;

        Ok(())
    }
}
