//! Document store traits (ports)
//!
//! The backend is a managed document database: JSON documents addressed by
//! `collection/id`, read-your-writes transactions over any group of documents,
//! and optimistic conflict detection at commit. The domain layer defines what
//! it needs here; `study-db` provides the adapters.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::{DocumentId, DocumentPath};

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

/// A stored document: a JSON object
pub type Document = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> RepoResult<Box<dyn StoreTransaction>>;

    /// Read a document outside any transaction (may be stale)
    async fn get(&self, path: &DocumentPath) -> RepoResult<Option<Document>>;

    /// Read every document in a collection outside any transaction, ordered by id
    async fn list(&self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>>;
}

/// An open transaction
///
/// Reads observe one consistent snapshot plus this transaction's own pending
/// writes. Writes are buffered until `commit`, which applies all of them
/// atomically or fails with [`DomainError::TransactionConflict`] if anything
/// read here was changed by another committed transaction.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Read a document
    async fn get(&mut self, path: &DocumentPath) -> RepoResult<Option<Document>>;

    /// Read every document in a collection, ordered by id
    async fn list(&mut self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>>;

    /// Create or replace a document
    fn set(&mut self, path: &DocumentPath, doc: Document);

    /// Merge top-level fields into an existing document
    ///
    /// Commit fails with `DocumentNotFound` if the document does not exist.
    fn update(&mut self, path: &DocumentPath, patch: Document);

    /// Delete a document (no-op if absent)
    fn delete(&mut self, path: &DocumentPath);

    /// Apply the buffered writes atomically
    async fn commit(self: Box<Self>) -> RepoResult<()>;

    /// Discard the buffered writes
    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}
