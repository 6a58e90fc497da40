use anyhow::{anyhow, Result};
use std::io;

use numerica_infrastructure::chat::TwitchChatFeed;
use numerica_lib::application::services::{ConfigService, GameSession};
use numerica_lib::presentation::bootstrap;
use numerica_lib::presentation::routes::Route;
use numerica_lib::presentation::view::TerminalView;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("❌ {:#}", e);
        eprintln!("numerica: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config_service = ConfigService::load()?;
    let config = config_service.config().clone();
    let data_dir = bootstrap::data_dir()?;

    init_logging(bootstrap::log_dir(&data_dir), config_service.log_level().as_str());

    tracing::info!("📁 Config path: {}", config_service.config_path().display());
    if let Some(reason) = config_service.load_error() {
        tracing::warn!("⚠️  Ignoring config file, using defaults: {}", reason);
    }

    let path = std::env::args().nth(1).unwrap_or_default();
    let route = Route::parse(&path).map_err(|e| anyhow!(e.format_with_code()))?;
    tracing::info!("Route: {}", route);

    match route {
        Route::Home => {
            TerminalView::new(io::stdout()).render_home();
        }
        Route::Channel(channel) => {
            let namespace = config
                .namespace()
                .map_err(|e| anyhow!(e.format_with_code()))?;
            let store = bootstrap::build_best_score_store(&data_dir, namespace).await?;
            let feed = TwitchChatFeed::new(config.twitch.clone());
            let view = TerminalView::new(io::stdout());

            let session = GameSession::new(channel, feed, store, view);
            tracing::info!("🚀 Starting session {}", session.id());
            session.run(shutdown_signal()).await;
        }
    }

    Ok(())
}

fn init_logging(log_dir: std::path::PathBuf, level: &str) {
    match numerica_infrastructure::logging::init_logger(log_dir.clone(), level) {
        Ok(_) => {
            let dir = numerica_infrastructure::logging::get_log_dir().unwrap_or(log_dir);
            tracing::info!("📝 File logging initialized at: {}", dir.display());
        }
        Err(e) => {
            eprintln!("⚠️  Failed to initialize file logging: {}", e);
            eprintln!("   Falling back to console logging only");

            let _ = tracing_subscriber::fmt()
                .with_env_filter(numerica_infrastructure::logging::build_filter(level))
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true)
                .try_init();
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl-C received"),
        Err(e) => tracing::error!("Failed to listen for Ctrl-C, stopping: {}", e),
    }
}
