//! In-memory implementation of DocumentStore
//!
//! Uses optimistic concurrency: every committed write stamps the document
//! with a fresh version from a store-wide clock, transactions remember the
//! versions they read, and commit validates those versions under the store
//! lock before applying anything. A changed read aborts the commit with
//! `TransactionConflict`, the same contract the managed backend offers.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use study_core::{
    Document, DocumentId, DocumentPath, DocumentStore, DomainError, RepoResult,
    StoreTransaction, WriteBatch,
};

/// Version reported for a document that does not exist
const ABSENT: u64 = 0;

#[derive(Debug, Clone)]
struct Versioned {
    doc: Document,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<DocumentPath, Versioned>,
    clock: u64,
    forced_conflicts: u32,
    commits: u64,
    conflicts: u64,
}

impl State {
    fn version_of(&self, path: &DocumentPath) -> u64 {
        self.docs.get(path).map_or(ABSENT, |entry| entry.version)
    }

    fn collection_versions(&self, collection: &str) -> BTreeMap<DocumentId, u64> {
        self.docs
            .iter()
            .filter(|(path, _)| path.collection() == collection)
            .map(|(path, entry)| (path.id().clone(), entry.version))
            .collect()
    }

    fn collection_docs(&self, collection: &str) -> Vec<(DocumentId, Document)> {
        self.docs
            .iter()
            .filter(|(path, _)| path.collection() == collection)
            .map(|(path, entry)| (path.id().clone(), entry.doc.clone()))
            .collect()
    }

    fn put(&mut self, path: DocumentPath, doc: Option<Document>) {
        match doc {
            Some(doc) => {
                self.clock += 1;
                let version = self.clock;
                self.docs.insert(path, Versioned { doc, version });
            }
            None => {
                self.docs.remove(&path);
            }
        }
    }
}

/// In-process document store
///
/// Cloning is cheap and every clone shares the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    state: Arc<Mutex<State>>,
}

impl MemoryDocumentStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Write a document outside any transaction
    pub fn insert(&self, path: &DocumentPath, doc: Document) {
        self.state.lock().put(path.clone(), Some(doc));
    }

    /// Make the next `count` commits fail with `TransactionConflict`
    pub fn inject_conflicts(&self, count: u32) {
        self.state.lock().forced_conflicts += count;
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> u64 {
        self.state.lock().commits
    }

    /// Number of commits rejected with a conflict so far
    pub fn conflict_count(&self) -> u64 {
        self.state.lock().conflicts
    }

    /// Number of stored documents across all collections
    pub fn len(&self) -> usize {
        self.state.lock().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn begin(&self) -> RepoResult<Box<dyn StoreTransaction>> {
        Ok(Box::new(MemoryTransaction {
            state: Arc::clone(&self.state),
            reads: HashMap::new(),
            collection_reads: HashMap::new(),
            writes: WriteBatch::new(),
        }))
    }

    async fn get(&self, path: &DocumentPath) -> RepoResult<Option<Document>> {
        Ok(self.state.lock().docs.get(path).map(|entry| entry.doc.clone()))
    }

    async fn list(&self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>> {
        Ok(self.state.lock().collection_docs(collection))
    }
}

/// Optimistic transaction over a MemoryDocumentStore
struct MemoryTransaction {
    state: Arc<Mutex<State>>,
    reads: HashMap<DocumentPath, u64>,
    collection_reads: HashMap<String, BTreeMap<DocumentId, u64>>,
    writes: WriteBatch,
}

impl MemoryTransaction {
    fn validate(&self, state: &State) -> bool {
        let documents_unchanged = self
            .reads
            .iter()
            .all(|(path, version)| state.version_of(path) == *version);

        let collections_unchanged = self
            .collection_reads
            .iter()
            .all(|(collection, versions)| state.collection_versions(collection) == *versions);

        documents_unchanged && collections_unchanged
    }
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get(&mut self, path: &DocumentPath) -> RepoResult<Option<Document>> {
        let (version, committed) = {
            let state = self.state.lock();
            let entry = state.docs.get(path);
            (
                entry.map_or(ABSENT, |e| e.version),
                entry.map(|e| e.doc.clone()),
            )
        };

        // First observation wins; a different later version fails validation anyway.
        self.reads.entry(path.clone()).or_insert(version);
        self.writes.overlay(path, committed)
    }

    async fn list(&mut self, collection: &str) -> RepoResult<Vec<(DocumentId, Document)>> {
        let (versions, committed) = {
            let state = self.state.lock();
            (
                state.collection_versions(collection),
                state.collection_docs(collection),
            )
        };

        self.collection_reads
            .entry(collection.to_string())
            .or_insert(versions);
        self.writes.overlay_collection(collection, committed)
    }

    fn set(&mut self, path: &DocumentPath, doc: Document) {
        self.writes.set(path, doc);
    }

    fn update(&mut self, path: &DocumentPath, patch: Document) {
        self.writes.update(path, patch);
    }

    fn delete(&mut self, path: &DocumentPath) {
        self.writes.delete(path);
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let mut state = self.state.lock();
        debug!(
            reads = self.reads.len(),
            writes = self.writes.len(),
            "Validating transaction"
        );

        if state.forced_conflicts > 0 {
            state.forced_conflicts -= 1;
            state.conflicts += 1;
            debug!("Injected commit conflict");
            return Err(DomainError::TransactionConflict);
        }

        if !self.validate(&state) {
            state.conflicts += 1;
            debug!("Read set changed since it was observed");
            return Err(DomainError::TransactionConflict);
        }

        let resolved = self
            .writes
            .resolve(|path| state.docs.get(path).map(|entry| entry.doc.clone()))?;

        for (path, doc) in resolved {
            state.put(path, doc);
        }
        state.commits += 1;

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}
