pub mod best_score_repo;

pub use best_score_repo::SqliteBestScoreRepository;
