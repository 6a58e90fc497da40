use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use numerica_domain::best_score::ScoreNamespace;
use numerica_domain::shared::DomainError;
use numerica_infrastructure::config::TwitchConfig;

/// Environment variable that points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "NUMERICA_CONFIG";

/// Log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Persistent configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// Storage key of the best score; shared by every channel
    pub score_namespace: String,
    pub twitch: TwitchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            score_namespace: ScoreNamespace::DEFAULT.to_string(),
            twitch: TwitchConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn namespace(&self) -> Result<ScoreNamespace, DomainError> {
        ScoreNamespace::new(&self.score_namespace)
    }
}

/// Loads the optional JSON config file.
///
/// A missing file means defaults. A file that cannot be read or parsed also
/// falls back to defaults; the reason is kept so it can be logged once the
/// logger is up.
pub struct ConfigService {
    config: AppConfig,
    config_path: PathBuf,
    load_error: Option<String>,
}

impl ConfigService {
    /// Load from `$NUMERICA_CONFIG`, or `<config dir>/numerica/config.json`
    pub fn load() -> Result<Self> {
        let override_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config_path = resolve_config_path(override_path)?;
        Ok(Self::load_from(config_path))
    }

    pub fn load_from(config_path: PathBuf) -> Self {
        let (config, load_error) = match read_config(&config_path) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (AppConfig::default(), None),
            Err(e) => (AppConfig::default(), Some(e.to_string())),
        };

        Self {
            config,
            config_path,
            load_error,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn log_level(&self) -> LogLevel {
        self.config.log_level
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Why the file on disk was ignored, if it was
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }
}

fn resolve_config_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }

    let config_dir = dirs::config_dir().ok_or_else(|| anyhow!("Failed to get config dir"))?;
    Ok(config_dir.join("numerica").join("config.json"))
}

fn read_config(path: &Path) -> Result<Option<AppConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?;
    let config = serde_json::from_str::<AppConfig>(&content)
        .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))?;

    Ok(Some(config))
}
