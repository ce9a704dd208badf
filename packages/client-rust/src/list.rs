//! List-view controller: one query state, one cache, one snapshot.

use std::sync::Arc;

use ngopi_core::page::Pagination;
use ngopi_core::query::CanonicalQuery;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::{CachedPage, FetchCache};
use crate::error::ClientError;
use crate::sync::QuerySync;

/// Render state of a list view at one instant.
#[derive(Debug)]
pub struct ListSnapshot<T> {
    /// Last successfully fetched page, retained across key changes so
    /// pagination does not flicker through an empty state.
    pub page: Option<CachedPage<T>>,
    /// A fetch is running and nothing has ever been shown.
    pub is_loading: bool,
    /// A fetch is running behind previously fetched rows.
    pub is_validating: bool,
    /// Failure of the most recently resolved fetch, if any.
    pub error: Option<Arc<ClientError>>,
}

impl<T> ListSnapshot<T> {
    /// Rows of the visible page; empty before the first result.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        self.page.as_ref().map_or(&[], |page| page.data.as_slice())
    }

    /// Pagination metadata of the visible page.
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.page.as_ref().map(|page| page.pagination)
    }
}

// Not derived: `derive(Clone)` would demand `T: Clone`, but the rows
// live behind a shared `Arc`.
impl<T> Clone for ListSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            page: self.page.clone(),
            is_loading: self.is_loading,
            is_validating: self.is_validating,
            error: self.error.clone(),
        }
    }
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            page: None,
            is_loading: false,
            is_validating: false,
            error: None,
        }
    }
}

/// Controller for one mounted list view.
///
/// The synchronizer owns the query state; this controller turns it into
/// fetches and folds the outcomes into a [`ListSnapshot`] the UI renders.
/// Fetches superseded by a newer one are discarded on resolution, so a
/// slow stale response never overwrites newer rows.
pub struct ResourceList<T> {
    sync: QuerySync,
    cache: Arc<FetchCache<T>>,
    state: RwLock<ListSnapshot<T>>,
}

impl<T> ResourceList<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(sync: QuerySync, cache: Arc<FetchCache<T>>) -> Self {
        Self {
            sync,
            cache,
            state: RwLock::new(ListSnapshot::default()),
        }
    }

    /// The synchronizer driving this view's query state.
    #[must_use]
    pub fn sync(&self) -> &QuerySync {
        &self.sync
    }

    /// The current render state.
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot<T> {
        self.state.read().clone()
    }

    /// Fetches the page for the current query and folds the outcome into
    /// the snapshot.
    ///
    /// A cached page applies immediately with no request. Otherwise the
    /// previous page stays visible while the fetch runs; `is_loading` is
    /// raised only when there is nothing to show, `is_validating` when
    /// stale rows are on screen.
    pub async fn refresh(&self) {
        let query = self.sync.current();
        if let Some(page) = self.cache.cached(&query) {
            let mut state = self.state.write();
            state.page = Some(page);
            state.is_loading = false;
            state.is_validating = false;
            state.error = None;
            return;
        }
        self.run_fetch(&query, false).await;
    }

    /// Forces a fresh request for the current query, bypassing the cache.
    pub async fn revalidate(&self) {
        let query = self.sync.current();
        self.run_fetch(&query, true).await;
    }

    /// Drives the view: one initial fetch, then one per committed query
    /// change. Runs until the owning task is cancelled.
    pub async fn run(&self) {
        let mut changes = self.sync.subscribe();
        self.refresh().await;
        while changes.changed().await.is_ok() {
            self.refresh().await;
        }
    }

    async fn run_fetch(&self, query: &CanonicalQuery, force: bool) {
        let generation = self.cache.next_generation();
        {
            let mut state = self.state.write();
            state.is_loading = state.page.is_none();
            state.is_validating = state.page.is_some();
        }

        let outcome = if force {
            self.cache.reload(query).await
        } else {
            self.cache.fetch(query).await
        };

        // A newer fetch was issued while this one was in flight; its
        // resolution owns the snapshot now.
        if !self.cache.is_current(generation) {
            debug!(
                resource = self.sync.spec().name,
                "discarding superseded response"
            );
            return;
        }

        let mut state = self.state.write();
        state.is_loading = false;
        state.is_validating = false;
        match outcome {
            Ok(page) => {
                state.page = Some(page);
                state.error = None;
            }
            Err(error) => {
                state.error = Some(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use ngopi_core::envelope::ListEnvelope;
    use ngopi_core::resources;
    use serde_json::Value;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::store::MemoryStateStore;
    use crate::transport::Transport;

    /// Echoes the requested key as the page's only row; queries matching
    /// `slow_marker` block until the gate releases a permit, and
    /// `fail_marker` queries answer 503.
    struct StubTransport {
        calls: AtomicUsize,
        gate: Arc<Semaphore>,
        slow_marker: Option<&'static str>,
        fail_marker: Option<&'static str>,
    }

    impl StubTransport {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Arc::new(Semaphore::new(0)),
                slow_marker: None,
                fail_marker: None,
            })
        }

        fn slow_on(marker: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Arc::new(Semaphore::new(0)),
                slow_marker: Some(marker),
                fail_marker: None,
            })
        }

        fn failing_on(marker: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Arc::new(Semaphore::new(0)),
                slow_marker: None,
                fail_marker: Some(marker),
            })
        }

        fn release(&self) {
            self.gate.add_permits(1);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn get_list(&self, endpoint: &str, query: &str) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_marker.is_some_and(|marker| query.contains(marker)) {
                self.gate.acquire().await.unwrap().forget();
            }
            if self.fail_marker.is_some_and(|marker| query.contains(marker)) {
                return Err(ClientError::Api {
                    status: 503,
                    message: "catalog temporarily unavailable".into(),
                });
            }
            let page = ListEnvelope {
                data: vec![format!("{endpoint}?{query}")],
                pagination: Pagination::new(1, 10, 1),
            };
            Ok(serde_json::to_value(page).unwrap())
        }
    }

    fn list_with(transport: Arc<StubTransport>) -> Arc<ResourceList<String>> {
        let sync = QuerySync::new(&resources::CAFES, Arc::new(MemoryStateStore::new()));
        let cache = Arc::new(FetchCache::new(&resources::CAFES, transport));
        Arc::new(ResourceList::new(sync, cache))
    }

    #[tokio::test]
    async fn refresh_populates_the_snapshot() {
        let transport = StubTransport::new();
        let list = list_with(Arc::clone(&transport));

        list.refresh().await;

        let snapshot = list.snapshot();
        assert_eq!(snapshot.rows().len(), 1);
        assert!(snapshot.rows()[0].contains("page=1"));
        assert_eq!(snapshot.pagination().unwrap().total, 1);
        assert!(!snapshot.is_loading);
        assert!(!snapshot.is_validating);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn first_fetch_raises_is_loading_until_resolution() {
        let transport = StubTransport::slow_on("page=1");
        let list = list_with(Arc::clone(&transport));

        let task = tokio::spawn({
            let list = Arc::clone(&list);
            async move { list.refresh().await }
        });
        tokio::task::yield_now().await;

        let snapshot = list.snapshot();
        assert!(snapshot.is_loading);
        assert!(!snapshot.is_validating);
        assert!(snapshot.rows().is_empty());

        transport.release();
        task.await.unwrap();
        let snapshot = list.snapshot();
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.rows().len(), 1);
    }

    #[tokio::test]
    async fn key_change_keeps_previous_rows_while_validating() {
        let transport = StubTransport::slow_on("page=2");
        let list = list_with(Arc::clone(&transport));

        list.refresh().await;
        let first_rows = list.snapshot().rows().to_vec();

        list.sync().set_page(2);
        let task = tokio::spawn({
            let list = Arc::clone(&list);
            async move { list.refresh().await }
        });
        tokio::task::yield_now().await;

        // Stale rows stay visible while the next page loads.
        let snapshot = list.snapshot();
        assert_eq!(snapshot.rows(), first_rows.as_slice());
        assert!(snapshot.is_validating);
        assert!(!snapshot.is_loading);

        transport.release();
        task.await.unwrap();
        assert!(list.snapshot().rows()[0].contains("page=2"));
    }

    #[tokio::test]
    async fn superseded_response_never_overwrites_newer_rows() {
        let transport = StubTransport::slow_on("page=1");
        let list = list_with(Arc::clone(&transport));

        // Page 1 hangs in flight.
        let stale = tokio::spawn({
            let list = Arc::clone(&list);
            async move { list.refresh().await }
        });
        tokio::task::yield_now().await;

        // Page 2 supersedes it and resolves first.
        list.sync().set_page(2);
        list.refresh().await;
        assert!(list.snapshot().rows()[0].contains("page=2"));

        // The stale resolution must not roll the view back.
        transport.release();
        stale.await.unwrap();
        assert!(list.snapshot().rows()[0].contains("page=2"));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_rows_and_reports_the_error() {
        let transport = StubTransport::failing_on("page=2");
        let list = list_with(Arc::clone(&transport));

        list.refresh().await;
        assert!(list.snapshot().error.is_none());

        list.sync().set_page(2);
        list.refresh().await;

        let snapshot = list.snapshot();
        assert!(snapshot.rows()[0].contains("page=1"));
        let error = snapshot.error.unwrap();
        assert!(matches!(*error, ClientError::Api { status: 503, .. }));
        assert!(!snapshot.is_loading);
        assert!(!snapshot.is_validating);
    }

    #[tokio::test]
    async fn cached_pages_apply_without_a_request() {
        let transport = StubTransport::new();
        let list = list_with(Arc::clone(&transport));

        list.refresh().await;
        list.sync().set_page(2);
        list.refresh().await;
        assert_eq!(transport.calls(), 2);

        // Going back to page 1 is a cache hit.
        list.sync().set_page(1);
        list.refresh().await;
        assert_eq!(transport.calls(), 2);
        assert!(list.snapshot().rows()[0].contains("page=1"));
    }

    #[tokio::test]
    async fn revalidate_forces_a_fresh_request() {
        let transport = StubTransport::new();
        let list = list_with(Arc::clone(&transport));

        list.refresh().await;
        list.refresh().await;
        assert_eq!(transport.calls(), 1);

        list.revalidate().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn run_follows_committed_query_changes() {
        let transport = StubTransport::new();
        let list = list_with(Arc::clone(&transport));

        let driver = tokio::spawn({
            let list = Arc::clone(&list);
            async move { list.run().await }
        });
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(list.snapshot().rows()[0].contains("page=1"));

        list.sync().set_page(3);
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        assert!(list.snapshot().rows()[0].contains("page=3"));

        driver.abort();
    }
}
