mod aggregate;
mod repository;

pub use aggregate::{BestScore, ScoreNamespace};
pub use repository::BestScoreRepository;
