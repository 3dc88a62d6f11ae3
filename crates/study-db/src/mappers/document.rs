//! Document row <-> domain mapper

use study_core::{Document, DocumentId, DomainError};

use crate::models::DocumentModel;

/// Convert a row into an `(id, document)` pair
pub fn into_entry(model: DocumentModel) -> Result<(DocumentId, Document), DomainError> {
    let id = DocumentId::parse(model.id.as_str())
        .map_err(|e| DomainError::InvalidDocument(format!("stored id {:?}: {e}", model.id)))?;
    Ok((id, model.data.0))
}
