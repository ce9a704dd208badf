//! Storage layer for the catalog.
//!
//! Three pieces:
//!
//! - [`record`]: the column-addressable [`Record`] model rows implement
//! - [`eval`]: in-memory execution of a `PredicateSet` (match + order)
//! - [`memory`]: the [`MemoryDataSource`] collection backing the server

pub mod eval;
pub mod memory;
pub mod record;

pub use memory::MemoryDataSource;
pub use record::{FieldValue, Record};
