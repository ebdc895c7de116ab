//! Domain-specific error types and error handling.

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let error = DomainError::NotFound {
            resource: "api token 'abc'".to_string(),
        };
        assert_eq!(error.to_string(), "Resource not found: api token 'abc'");
    }

    #[test]
    fn test_internal_wraps_message() {
        let error = DomainError::Internal {
            message: "connection refused".to_string(),
        };
        assert!(error.to_string().contains("connection refused"));
    }
}
