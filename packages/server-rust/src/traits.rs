//! Data-source contract between the repository and storage backends.
//! Implementations: in-memory (`MemoryDataSource`); SQL (future).

use async_trait::async_trait;
use ngopi_core::PredicateSet;

use crate::storage::Record;

/// Failure reaching or reading the underlying store.
///
/// The repository propagates these as-is; retry policy, if any, belongs
/// to a higher layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Read side of a resource collection.
///
/// `select` and `count` both take the full predicate set; the repository
/// calls them back-to-back with the same set so a page and its total are
/// never computed against different filters.
#[async_trait]
pub trait DataSource<R: Record>: Send + Sync {
    /// The ordered page slice: filter, sort, then skip `offset` and take
    /// `limit` rows.
    async fn select(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<R>, StorageError>;

    /// Number of records matching the predicate conditions, ignoring
    /// pagination.
    async fn count(&self, predicates: &PredicateSet) -> Result<u64, StorageError>;

    /// Single record by id. Zero rows is `Ok(None)`, not an error.
    async fn find(&self, id: &str) -> Result<Option<R>, StorageError>;

    /// First record whose `column` equals `value`, by id order. Used for
    /// secondary identities such as slugs.
    async fn find_where(&self, column: &str, value: &str) -> Result<Option<R>, StorageError>;
}
