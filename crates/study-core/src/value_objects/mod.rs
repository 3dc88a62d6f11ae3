//! Value objects - immutable types that represent domain concepts

mod document_path;
mod ids;

pub use document_path::DocumentPath;
pub use ids::{DocumentId, IdParseError, UserId};
