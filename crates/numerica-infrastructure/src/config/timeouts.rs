use std::time::Duration;

/// Configuration for the timeout durations used by infrastructure adapters
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// TCP connect + IRC handshake
    pub chat_connect: Duration,

    /// Sending PART/QUIT and closing the socket
    pub chat_disconnect: Duration,

    /// Database connection
    pub db_connect: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        GLOBAL_TIMEOUT_CONFIG.clone()
    }
}

impl TimeoutConfig {
    /// Get the global timeout configuration
    pub fn global() -> &'static Self {
        &GLOBAL_TIMEOUT_CONFIG
    }
}

/// Global timeout configuration instance
static GLOBAL_TIMEOUT_CONFIG: TimeoutConfig = TimeoutConfig {
    chat_connect: Duration::from_secs(10),
    chat_disconnect: Duration::from_secs(3),
    db_connect: Duration::from_secs(10),
};
