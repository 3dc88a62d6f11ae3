//! Document database model

use sqlx::types::Json;
use sqlx::FromRow;
use study_core::Document;

/// Database model for the documents table
#[derive(Debug, Clone, FromRow)]
pub struct DocumentModel {
    pub id: String,
    pub data: Json<Document>,
}
