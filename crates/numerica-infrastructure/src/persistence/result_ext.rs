use numerica_domain::shared::DomainError;

/// Extension trait for mapping storage errors into domain errors
pub trait ResultExt<T> {
    /// Convert error to DomainError::Repository with context
    /// Usage: `query.await.map_repo_error("Failed to load best score")?`
    fn map_repo_error(self, context: &str) -> Result<T, DomainError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn map_repo_error(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Repository(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_repo_error() {
        let result: Result<i32, &str> = Err("disk full");
        match result.map_repo_error("Failed to save") {
            Err(DomainError::Repository(msg)) => assert_eq!(msg, "Failed to save: disk full"),
            _ => panic!("Expected Repository error"),
        }
    }
}
