//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    // =========================================================================
    // Identity / Validation Errors
    // =========================================================================
    #[error("Sign-in required")]
    Unauthenticated,

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    // =========================================================================
    // Transaction Errors
    // =========================================================================
    #[error("Transaction conflict")]
    TransactionConflict,

    #[error("Transaction failed after {attempts} attempt(s): {reason}")]
    TransactionFailed { attempts: u32, reason: String },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for client-facing responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::TargetNotFound(_) => "UNKNOWN_TARGET",
            Self::ProfileNotFound(_) => "UNKNOWN_PROFILE",
            Self::DocumentNotFound(_) => "UNKNOWN_DOCUMENT",

            // Identity / Validation
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidDocument(_) => "INVALID_DOCUMENT",

            // Transactions
            Self::TransactionConflict => "TRANSACTION_CONFLICT",
            Self::TransactionFailed { .. } => "TRANSACTION_FAILED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TargetNotFound(_) | Self::ProfileNotFound(_) | Self::DocumentNotFound(_)
        )
    }

    /// Check if retrying the whole transaction may succeed
    ///
    /// Write conflicts and backend/transport failures are retried; anything
    /// raised by the transaction body itself is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionConflict | Self::DatabaseError(_))
    }
}
