//! Deduplicated, cached list fetching.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use ngopi_core::envelope::ListEnvelope;
use ngopi_core::query::CanonicalQuery;
use ngopi_core::spec::ResourceSpec;
use parking_lot::Mutex;
use quick_cache::sync::Cache;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::transport::Transport;

/// Completed pages kept per resource before eviction.
const RESULT_CAPACITY: usize = 64;

/// One fetched page, shared between the cache and every view holding it.
pub type CachedPage<T> = Arc<ListEnvelope<T>>;

/// Outcome of one fetch, cloneable across deduplicated waiters.
pub type FetchResult<T> = Result<CachedPage<T>, Arc<ClientError>>;

type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

/// Fetch layer for one resource: caches completed pages and deduplicates
/// concurrent requests for the same key.
///
/// The cache key is the endpoint plus the canonical query encoding, so
/// two views asking the same question share one entry. Concurrent
/// fetches of an identical key join a single shared request. Completed
/// pages are served from cache without revalidation; nothing refetches
/// behind the caller's back -- [`FetchCache::reload`] is the explicit
/// way to get fresh data, [`FetchCache::mutate`] the optimistic local
/// edit after a write. Errors are shared with every waiter but never
/// cached.
pub struct FetchCache<T> {
    spec: &'static ResourceSpec,
    transport: Arc<dyn Transport>,
    inner: Arc<CacheInner<T>>,
    generation: AtomicU64,
}

struct CacheInner<T> {
    results: Cache<String, CachedPage<T>>,
    in_flight: Mutex<HashMap<String, SharedFetch<T>>>,
}

impl<T> FetchCache<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(spec: &'static ResourceSpec, transport: Arc<dyn Transport>) -> Self {
        Self {
            spec,
            transport,
            inner: Arc::new(CacheInner {
                results: Cache::new(RESULT_CAPACITY),
                in_flight: Mutex::new(HashMap::new()),
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Cache key for `query`: endpoint plus canonical encoding.
    #[must_use]
    pub fn key_for(&self, query: &CanonicalQuery) -> String {
        format!("{}?{}", self.spec.endpoint, query.to_query_string())
    }

    /// The completed page for `query`, if one is cached.
    #[must_use]
    pub fn cached(&self, query: &CanonicalQuery) -> Option<CachedPage<T>> {
        self.inner.results.get(&self.key_for(query))
    }

    /// Fetches the page for `query`.
    ///
    /// Serves a completed result from cache without a request; otherwise
    /// joins the in-flight request for the same key when one exists, so
    /// concurrent identical calls cost one round trip.
    pub async fn fetch(&self, query: &CanonicalQuery) -> FetchResult<T> {
        let key = self.key_for(query);
        if let Some(page) = self.inner.results.get(&key) {
            return Ok(page);
        }
        self.join_or_start(query, key).await
    }

    /// Drops any cached page for `query` and fetches it fresh.
    pub async fn reload(&self, query: &CanonicalQuery) -> FetchResult<T> {
        let key = self.key_for(query);
        let _ = self.inner.results.remove(&key);
        self.join_or_start(query, key).await
    }

    /// Edits the cached page for `query` in place, if one exists.
    ///
    /// The optimistic path after a local write: the edit is visible to
    /// every reader immediately. Follow with [`FetchCache::reload`] to
    /// revalidate against the server.
    pub fn mutate(&self, query: &CanonicalQuery, edit: impl FnOnce(&mut ListEnvelope<T>)) -> bool
    where
        T: Clone,
    {
        let key = self.key_for(query);
        match self.inner.results.get(&key) {
            Some(page) => {
                let mut edited = (*page).clone();
                edit(&mut edited);
                self.inner.results.insert(key, Arc::new(edited));
                true
            }
            None => false,
        }
    }

    /// Drops every completed page. In-flight requests are unaffected.
    pub fn clear(&self) {
        self.inner.results.clear();
    }

    /// Tags a fetch about to be issued; the newest tag wins.
    #[must_use]
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether `generation` is still the newest issued tag.
    ///
    /// A resolution carrying a stale tag belongs to a superseded key and
    /// must not overwrite newer view state.
    #[must_use]
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Relaxed) == generation
    }

    fn join_or_start(&self, query: &CanonicalQuery, key: String) -> SharedFetch<T> {
        let mut in_flight = self.inner.in_flight.lock();
        if let Some(existing) = in_flight.get(&key) {
            return existing.clone();
        }
        let fetch = self.start_fetch(query, key.clone());
        in_flight.insert(key, fetch.clone());
        fetch
    }

    /// Builds the shared request future for `key`. The body runs once,
    /// driven by whichever waiter polls first; completion moves the
    /// result from the in-flight table into the result cache.
    fn start_fetch(&self, query: &CanonicalQuery, key: String) -> SharedFetch<T> {
        let transport = Arc::clone(&self.transport);
        let inner = Arc::clone(&self.inner);
        let endpoint = self.spec.endpoint;
        let encoded = query.to_query_string();
        async move {
            let outcome = match transport.get_list(endpoint, &encoded).await {
                Ok(body) => serde_json::from_value::<ListEnvelope<T>>(body)
                    .map(Arc::new)
                    .map_err(|err| Arc::new(ClientError::Decode(err))),
                Err(err) => Err(Arc::new(err)),
            };
            if let Ok(page) = &outcome {
                inner.results.insert(key.clone(), Arc::clone(page));
            }
            inner.in_flight.lock().remove(&key);
            outcome
        }
        .boxed()
        .shared()
    }
}
