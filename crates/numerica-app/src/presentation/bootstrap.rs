use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use numerica_domain::best_score::{BestScoreRepository, ScoreNamespace};
use numerica_infrastructure::persistence::{repositories::SqliteBestScoreRepository, Database};

use crate::application::services::BestScoreStore;

/// `<platform data dir>/numerica`
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| anyhow!("Failed to get app data directory"))?;
    Ok(base.join("numerica"))
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

pub fn db_filename() -> &'static str {
    if cfg!(debug_assertions) {
        "numerica-dev.db"
    } else {
        "numerica.db"
    }
}

/// Open the database, migrate it and load the best score for `namespace`
pub async fn build_best_score_store(
    data_dir: &Path,
    namespace: ScoreNamespace,
) -> Result<BestScoreStore> {
    let startup_started_at = Instant::now();

    let started_at = Instant::now();
    std::fs::create_dir_all(data_dir).with_context(|| {
        format!(
            "Failed to create app data directory {}",
            data_dir.display()
        )
    })?;
    info!(
        "✓ Ensured app data dir exists ({}ms)",
        started_at.elapsed().as_millis()
    );

    let db_path = data_dir.join(db_filename());
    let db_path_str = db_path.to_str().ok_or_else(|| anyhow!("Invalid database path"))?;
    info!("Database path: {}", db_path_str);

    info!("🔌 Connecting to database...");
    let started_at = Instant::now();
    let database = Database::new(db_path_str)
        .await
        .map_err(|e| anyhow!(e.format_with_code()))?;
    info!(
        "✓ Database connection established ({}ms)",
        started_at.elapsed().as_millis()
    );

    info!("🔄 Running migrations...");
    let started_at = Instant::now();
    database
        .run_migrations()
        .await
        .map_err(|e| anyhow!(e.format_with_code()))?;
    info!(
        "✓ Migrations completed ({}ms)",
        started_at.elapsed().as_millis()
    );

    let pool = Arc::new(database.pool().clone());
    let repo = Arc::new(SqliteBestScoreRepository::new(pool)) as Arc<dyn BestScoreRepository>;

    let store = BestScoreStore::load(repo, namespace)
        .await
        .map_err(|e| anyhow!(e.format_with_code()))?;

    info!(
        "✅ Best score store ready ({}ms)",
        startup_started_at.elapsed().as_millis()
    );
    Ok(store)
}
