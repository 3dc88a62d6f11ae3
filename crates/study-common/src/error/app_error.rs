//! Application error types
//!
//! Unified error handling for everything above the domain layer.

use study_core::DomainError;

use crate::config::ConfigError;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Identity errors
    #[error("Sign-in required")]
    Unauthenticated,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Store errors
    #[error("Database error: {0}")]
    Database(String),

    // Internal errors
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Get error code for client-facing payloads
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Unauthenticated.error_code(), "UNAUTHENTICATED");
        assert_eq!(AppError::NotFound("q1".to_string()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::from(DomainError::TransactionConflict).error_code(),
            "TRANSACTION_CONFLICT"
        );
        assert_eq!(
            AppError::from(ConfigError::MissingVar("DATABASE_URL")).error_code(),
            "CONFIG_ERROR"
        );
    }
}
