//! Buffered transaction writes shared by the store adapters

use std::collections::BTreeMap;

use crate::error::DomainError;
use crate::value_objects::{DocumentId, DocumentPath};

use super::store::{Document, RepoResult};

/// A single buffered write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Set { path: DocumentPath, doc: Document },
    Update { path: DocumentPath, patch: Document },
    Delete { path: DocumentPath },
}

impl WriteOp {
    /// Document this write targets
    pub fn path(&self) -> &DocumentPath {
        match self {
            Self::Set { path, .. } | Self::Update { path, .. } | Self::Delete { path } => path,
        }
    }

    /// Apply this write to the current state of its document
    pub fn apply(&self, current: Option<Document>) -> RepoResult<Option<Document>> {
        match self {
            Self::Set { doc, .. } => Ok(Some(doc.clone())),
            Self::Update { path, patch } => {
                let mut doc =
                    current.ok_or_else(|| DomainError::DocumentNotFound(path.to_string()))?;
                for (field, value) in patch {
                    doc.insert(field.clone(), value.clone());
                }
                Ok(Some(doc))
            }
            Self::Delete { .. } => Ok(None),
        }
    }
}

/// Ordered list of writes buffered by a transaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: &DocumentPath, doc: Document) {
        self.ops.push(WriteOp::Set {
            path: path.clone(),
            doc,
        });
    }

    pub fn update(&mut self, path: &DocumentPath, patch: Document) {
        self.ops.push(WriteOp::Update {
            path: path.clone(),
            patch,
        });
    }

    pub fn delete(&mut self, path: &DocumentPath) {
        self.ops.push(WriteOp::Delete { path: path.clone() });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.ops.iter()
    }

    /// State of one document after applying the pending writes to `base`
    pub fn overlay(&self, path: &DocumentPath, base: Option<Document>) -> RepoResult<Option<Document>> {
        self.ops
            .iter()
            .filter(|op| op.path() == path)
            .try_fold(base, |current, op| op.apply(current))
    }

    /// State of a whole collection after applying the pending writes to `base`
    pub fn overlay_collection(
        &self,
        collection: &str,
        base: Vec<(DocumentId, Document)>,
    ) -> RepoResult<Vec<(DocumentId, Document)>> {
        let mut docs: BTreeMap<DocumentId, Document> = base.into_iter().collect();
        for op in self.ops.iter().filter(|op| op.path().collection() == collection) {
            let id = op.path().id().clone();
            if let Some(doc) = op.apply(docs.remove(&id))? {
                docs.insert(id, doc);
            }
        }
        Ok(docs.into_iter().collect())
    }

    /// Final state of every touched document, in first-touch order
    ///
    /// `base` supplies the committed state of a document.
    pub fn resolve<F>(&self, mut base: F) -> RepoResult<Vec<(DocumentPath, Option<Document>)>>
    where
        F: FnMut(&DocumentPath) -> Option<Document>,
    {
        let mut order: Vec<DocumentPath> = Vec::new();
        let mut states: BTreeMap<DocumentPath, Option<Document>> = BTreeMap::new();
        for op in &self.ops {
            let path = op.path();
            let current = match states.remove(path) {
                Some(state) => state,
                None => {
                    order.push(path.clone());
                    base(path)
                }
            };
            states.insert(path.clone(), op.apply(current)?);
        }
        Ok(order
            .into_iter()
            .map(|path| {
                let state = states.remove(&path).flatten();
                (path, state)
            })
            .collect())
    }
}
