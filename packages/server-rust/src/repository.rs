//! Resource repository: executes compiled queries against a data source.

use std::sync::Arc;

use ngopi_core::{translate, CanonicalQuery, PageResult, Pagination, ResourceSpec};

use crate::storage::Record;
use crate::traits::{DataSource, StorageError};

/// Read-side gateway for one resource.
///
/// Holds the resource's static spec and a data source; every query is
/// translated to predicates once and executed as exactly two reads (page
/// slice, then total count) against that same predicate set, so the rows
/// and the count can never disagree about the filters.
pub struct Repository<R: Record> {
    spec: &'static ResourceSpec,
    source: Arc<dyn DataSource<R>>,
}

impl<R: Record> Repository<R> {
    pub fn new(spec: &'static ResourceSpec, source: Arc<dyn DataSource<R>>) -> Self {
        Self { spec, source }
    }

    /// The resource spec this repository serves.
    #[must_use]
    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    /// One page of matching rows plus pagination metadata.
    ///
    /// A page past the end returns empty rows with intact metadata, not
    /// an error. Storage failures propagate untouched; there is no retry
    /// here.
    pub async fn query(&self, query: &CanonicalQuery) -> Result<PageResult<R>, StorageError> {
        let predicates = translate(query, self.spec);
        let offset = u64::from(query.page.saturating_sub(1)) * u64::from(query.limit);

        let rows = self.source.select(&predicates, offset, query.limit).await?;
        let total = self.source.count(&predicates).await?;

        tracing::debug!(
            resource = self.spec.name,
            conditions = predicates.conditions.len(),
            page = query.page,
            rows = rows.len(),
            total,
            "query executed"
        );

        Ok(PageResult {
            rows,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    /// Single record by id; `Ok(None)` when absent (not-found handling
    /// is the caller's concern).
    pub async fn find_by_id(&self, id: &str) -> Result<Option<R>, StorageError> {
        self.source.find(id).await
    }

    /// Single record by slug column.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<R>, StorageError> {
        self.source.find_where("slug", slug).await
    }
}
