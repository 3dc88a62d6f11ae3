//! Model to domain mappers

mod document;

pub use document::into_entry;
