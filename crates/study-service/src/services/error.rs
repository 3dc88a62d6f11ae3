//! Service layer error types
//!
//! Provides a unified error type for all service operations. None of these
//! are fatal: the UI keeps its previous state and lets the user retry.

use study_common::AppError;
use study_core::DomainError;
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// No signed-in user
    Unauthenticated,

    /// Store transaction gave up after its retry budget
    TransactionFailed { attempts: u32, reason: String },

    /// Validation error
    Validation(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Unauthenticated => write!(f, "Sign-in required"),
            Self::TransactionFailed { attempts, reason } => {
                write!(f, "Transaction failed after {attempts} attempt(s): {reason}")
            }
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Get the error code for client payloads
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::TransactionFailed { .. } => "TRANSACTION_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Short text for an error toast
    ///
    /// Only vote and recount transactions can exhaust their retries, so
    /// `TransactionFailed` carries the vote wording.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Please sign in to vote.",
            Self::NotFound { resource: "Profile", .. } => "Complete your profile to find partners.",
            Self::NotFound { .. } => "This post is no longer available.",
            Self::TransactionFailed { .. } => "Failed to process your vote. Try again.",
            Self::Domain(_) | Self::Validation(_) => "Something went wrong. Try again.",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::TargetNotFound(id) => Self::not_found("Target", id),
            DomainError::ProfileNotFound(id) => Self::not_found("Profile", id),
            DomainError::Unauthenticated => Self::Unauthenticated,
            DomainError::TransactionFailed { attempts, reason } => {
                Self::TransactionFailed { attempts, reason }
            }
            other => Self::Domain(other),
        }
    }
}

/// Lets binaries report service failures through their own error type
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::NotFound { resource, id } => {
                AppError::NotFound(format!("{resource} {id}"))
            }
            ServiceError::Unauthenticated => AppError::Unauthenticated,
            ServiceError::TransactionFailed { attempts, reason } => {
                AppError::Domain(DomainError::TransactionFailed { attempts, reason })
            }
            ServiceError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
