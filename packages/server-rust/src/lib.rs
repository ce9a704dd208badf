//! Ngopi Server -- HTTP API over the cafe catalog: filterable listings,
//! review rollups, and admin mutations.

pub mod catalog;
pub mod network;
pub mod repository;
pub mod storage;
pub mod traits;

pub use repository::Repository;
pub use traits::{DataSource, StorageError};
