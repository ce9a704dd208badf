//! Query state synchronization for one mounted list view.

use std::sync::Arc;
use std::time::Duration;

use ngopi_core::query::{CanonicalQuery, FilterValue, RawQuery, SortDirection};
use ngopi_core::query::{DEFAULT_PAGE, MAX_LIMIT};
use ngopi_core::spec::ResourceSpec;
use tokio::sync::watch;
use tracing::debug;

use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::store::QueryStateStore;

/// Synchronizes a list view's canonical query with its state store.
///
/// The store is the single source of truth: every read re-derives the
/// canonical query from the stored string and every setter writes the
/// canonical encoding back, so there is no second copy of the state to
/// drift. Setters are synchronous transitions; subscribers are notified
/// after each commit and decide when to fetch.
///
/// A malformed stored query (someone hand-edited `?page=0` into the
/// address bar) degrades to the resource defaults instead of failing.
#[derive(Clone)]
pub struct QuerySync {
    spec: &'static ResourceSpec,
    store: Arc<dyn QueryStateStore>,
    changes: watch::Sender<CanonicalQuery>,
    debouncer: Debouncer,
}

impl QuerySync {
    /// Synchronizer with the default search debounce.
    #[must_use]
    pub fn new(spec: &'static ResourceSpec, store: Arc<dyn QueryStateStore>) -> Self {
        Self::with_debounce(spec, store, DEFAULT_DEBOUNCE)
    }

    /// Synchronizer with an explicit search debounce delay.
    #[must_use]
    pub fn with_debounce(
        spec: &'static ResourceSpec,
        store: Arc<dyn QueryStateStore>,
        delay: Duration,
    ) -> Self {
        let initial = derive(spec, &*store);
        let (changes, _) = watch::channel(initial);
        Self {
            spec,
            store,
            changes,
            debouncer: Debouncer::new(delay),
        }
    }

    /// The resource this synchronizer serves.
    #[must_use]
    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }

    /// The canonical query derived from the store's current content.
    #[must_use]
    pub fn current(&self) -> CanonicalQuery {
        derive(self.spec, &*self.store)
    }

    /// Receiver observing every committed query change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CanonicalQuery> {
        self.changes.subscribe()
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Jumps to `page`, verbatim apart from the minimum of 1.
    ///
    /// There is no upper clamp: paging past the end is answered by the
    /// server with an empty page and intact metadata, so the caller can
    /// recover without a round trip through this state machine.
    pub fn set_page(&self, page: u32) {
        let mut query = self.current();
        query.page = page.max(1);
        self.commit(query);
    }

    /// Changes the page size and returns to the first page.
    pub fn set_limit(&self, limit: u32) {
        let mut query = self.current();
        query.limit = limit.clamp(1, MAX_LIMIT);
        query.page = DEFAULT_PAGE;
        self.commit(query);
    }

    /// Sets or clears one filter and returns to the first page.
    ///
    /// `None` (or an empty value) removes the filter entirely.
    pub fn set_filter(&self, key: &str, value: Option<FilterValue>) {
        let mut query = self.current();
        query.set_filter(key, value);
        query.page = DEFAULT_PAGE;
        self.commit(query);
    }

    /// Toggles one token in a filter and returns to the first page.
    ///
    /// A single-value filter is a set of one: toggling its own token
    /// clears the filter, toggling another token grows it to a
    /// two-element set. Toggling the same token twice restores the
    /// original filter. `token` is compared against the canonical tokens
    /// the compiled query holds, so pass canonical domain values rather
    /// than aliases.
    pub fn toggle_filter(&self, key: &str, token: &str) {
        let mut query = self.current();
        let next = match query.filter(key) {
            Some(value) => value.toggled(token),
            None => Some(FilterValue::One(token.to_string())),
        };
        query.set_filter(key, next);
        query.page = DEFAULT_PAGE;
        self.commit(query);
    }

    /// Sorts by `key`: re-selecting the current key flips the direction,
    /// selecting a new key starts ascending. The page is kept -- sorting
    /// reorders the whole result set, it does not invalidate the reader's
    /// position in it.
    pub fn set_sort(&self, key: &str) {
        if self.spec.sortable(key).is_none() {
            debug!(resource = self.spec.name, key, "ignoring unknown sort key");
            return;
        }
        let mut query = self.current();
        if query.sort_key.as_deref() == Some(key) {
            query.sort_dir = query.sort_dir.flipped();
        } else {
            query.sort_key = Some(key.to_string());
            query.sort_dir = SortDirection::Asc;
        }
        self.commit(query);
    }

    /// Clears the search term and every filter, returning to the first
    /// page. Limit and sort survive.
    pub fn reset_filters(&self) {
        let mut query = self.current();
        query.search.clear();
        query.filters.clear();
        query.page = DEFAULT_PAGE;
        self.commit(query);
    }

    /// Commits a search term immediately, returning to the first page.
    pub fn set_search_now(&self, term: impl Into<String>) {
        let mut query = self.current();
        query.search = term.into().trim().to_string();
        query.page = DEFAULT_PAGE;
        self.commit(query);
    }

    /// Commits a search term after the debounce delay; a burst of calls
    /// within the window commits only the last term. Requires a Tokio
    /// runtime (the delay runs on a spawned task).
    pub fn set_search(&self, term: impl Into<String>) {
        let term = term.into();
        let sync = self.clone();
        self.debouncer.call(move || sync.set_search_now(term));
    }

    fn commit(&self, query: CanonicalQuery) {
        self.store.replace(&query.to_query_string());
        let _ = self.changes.send_replace(query);
    }
}

/// Compiles the store's content, degrading to defaults when malformed.
fn derive(spec: &'static ResourceSpec, store: &dyn QueryStateStore) -> CanonicalQuery {
    let raw = RawQuery::from_query_string(&store.read());
    match spec.compile(&raw) {
        Ok(query) => query,
        Err(err) => {
            debug!(
                resource = spec.name,
                error = %err,
                "stored query is malformed, using defaults"
            );
            spec.compile(&RawQuery::new()).unwrap_or_default()
        }
    }
}
