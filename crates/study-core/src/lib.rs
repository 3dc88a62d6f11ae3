//! # study-core
//!
//! Domain layer containing entities, value objects, and the document store ports.
//! This crate has zero dependencies on infrastructure (database driver, runtime, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AcademicLevel, Reaction, TargetKind, TargetRef, UserProfile, VoteCounters, VoteType,
    DEFAULT_QUESTIONS_COLLECTION,
};
pub use error::DomainError;
pub use traits::{Document, DocumentStore, RepoResult, StoreTransaction, WriteBatch, WriteOp};
pub use value_objects::{DocumentId, DocumentPath, IdParseError, UserId};
