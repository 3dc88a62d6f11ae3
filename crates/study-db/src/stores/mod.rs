//! Document store implementations
//!
//! Adapters for the `DocumentStore` port defined in study-core.

mod error;
mod memory;
mod postgres;

pub use error::map_db_error;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
