//! Error handling utilities for stores

use sqlx::Error as SqlxError;
use study_core::DomainError;

/// SQLSTATE serialization_failure
const SERIALIZATION_FAILURE: &str = "40001";
/// SQLSTATE deadlock_detected
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError
///
/// Serialization failures and deadlocks are the backend telling us another
/// transaction won; they become `TransactionConflict` so the runner retries.
pub fn map_db_error(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if let Some(code) = db_err.code() {
            if code == SERIALIZATION_FAILURE || code == DEADLOCK_DETECTED {
                return DomainError::TransactionConflict;
            }
        }
    }
    DomainError::DatabaseError(e.to_string())
}
