//! # study-db
//!
//! Store layer implementing the document store ports from `study-core`.
//!
//! ## Overview
//!
//! - `PgDocumentStore`: PostgreSQL JSONB documents with SERIALIZABLE transactions
//! - `MemoryDocumentStore`: in-process store with optimistic version checks
//! - `run_transaction`: commit-or-retry loop used by the services
//!
//! ## Usage
//!
//! ```rust,ignore
//! use study_db::{create_pool, ensure_schema, DatabaseConfig, PgDocumentStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     ensure_schema(&pool).await?;
//!     let store = PgDocumentStore::new(pool);
//!
//!     // Hand the store to the services...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod stores;
pub mod transaction;

// Re-export commonly used types
pub use pool::{create_pool, ensure_schema, DatabaseConfig, PgPool};
pub use stores::{map_db_error, MemoryDocumentStore, PgDocumentStore};
pub use transaction::{run_transaction, RetryPolicy};
