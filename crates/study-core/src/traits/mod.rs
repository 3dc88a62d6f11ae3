//! Ports - the interface to the external document store

mod batch;
mod store;

pub use batch::{WriteBatch, WriteOp};
pub use store::{Document, DocumentStore, RepoResult, StoreTransaction};
