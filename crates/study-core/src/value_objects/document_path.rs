//! Slash-separated document paths (`collection/id`, with nested sub-collections)

use std::fmt;

use super::DocumentId;

/// Location of a document in the store
///
/// The collection may itself be nested below another document, e.g.
/// `communityQuestions/q1/answers`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: String,
    id: DocumentId,
}

impl DocumentPath {
    /// Create a path to a document in `collection`
    pub fn new(collection: impl Into<String>, id: DocumentId) -> Self {
        Self {
            collection: collection.into(),
            id,
        }
    }

    /// Collection part of the path
    #[inline]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Document id
    #[inline]
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Path of a sub-collection below this document
    pub fn sub_collection(&self, name: &str) -> String {
        format!("{}/{}/{}", self.collection, self.id, name)
    }

    /// Path of a document inside a sub-collection below this document
    pub fn child(&self, sub_collection: &str, id: DocumentId) -> Self {
        Self::new(self.sub_collection(sub_collection), id)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
