use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod channel;

pub use channel::ChannelName;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(s: &str) -> Self {
                Self(s.to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(SessionId);

/// Error codes for structured error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Resource Not Found (2xxx)
    RouteNotFound = 2001,

    // Data & Persistence (4xxx)
    RepositoryError = 4001,

    // Infrastructure (5xxx)
    InfrastructureError = 5001,
    ConnectionError = 5002,
    TimeoutError = 5003,

    // Validation (6xxx)
    ValidationError = 6001,
}

impl ErrorCode {
    /// Get error code as integer
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorCode::ConnectionError | ErrorCode::TimeoutError => ErrorSeverity::Warning,

            ErrorCode::RouteNotFound | ErrorCode::ValidationError => ErrorSeverity::Info,

            ErrorCode::RepositoryError | ErrorCode::InfrastructureError => ErrorSeverity::Error,
        }
    }

    /// Check if error is recoverable
    ///
    /// Recoverable here means the game can keep running; nothing is retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ConnectionError | ErrorCode::TimeoutError | ErrorCode::RepositoryError
        )
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Get error code
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Repository(_) => ErrorCode::RepositoryError,
            DomainError::Infrastructure(_) => ErrorCode::InfrastructureError,
            DomainError::Connection(_) => ErrorCode::ConnectionError,
            DomainError::Timeout(_) => ErrorCode::TimeoutError,
            DomainError::Validation(_) => ErrorCode::ValidationError,
            DomainError::NotFound(_) => ErrorCode::RouteNotFound,
        }
    }

    /// Get error message
    pub fn message(&self) -> &str {
        match self {
            DomainError::Repository(msg)
            | DomainError::Infrastructure(msg)
            | DomainError::Connection(msg)
            | DomainError::Timeout(msg)
            | DomainError::Validation(msg)
            | DomainError::NotFound(msg) => msg,
        }
    }

    /// Get error severity
    pub fn severity(&self) -> ErrorSeverity {
        self.code().severity()
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        self.code().is_recoverable()
    }

    /// Format error with code
    pub fn format_with_code(&self) -> String {
        format!("[{}] {}", self.code().code(), self)
    }
}
