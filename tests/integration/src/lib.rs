//! Integration test utilities for study-hub
//!
//! This crate wires the services to an in-memory document store and
//! provides fixtures for end-to-end vote and matching tests.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
