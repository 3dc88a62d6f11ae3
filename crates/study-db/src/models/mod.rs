//! Database models
//!
//! These structs map directly to database rows and use SQLx's `FromRow` derive.

mod document;

pub use document::DocumentModel;
