mod best_score_store;
mod config_service;
mod game_session;

pub use best_score_store::BestScoreStore;
pub use config_service::{AppConfig, ConfigService, LogLevel, CONFIG_PATH_ENV};
pub use game_session::GameSession;
