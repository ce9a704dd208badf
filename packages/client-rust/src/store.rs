//! Injectable query state stores.
//!
//! A list view's canonical state lives in exactly one place: its store.
//! [`UrlStateStore`] keeps a whole URL and rewrites only its query
//! component, which gives address-bar synchronization; [`MemoryStateStore`]
//! holds just the query string for embedded widgets that must not touch
//! navigation. Both satisfy the same contract, so the synchronizer never
//! knows which mode it is running in.

use parking_lot::RwLock;
use url::Url;

/// Storage for one view's serialized query state.
///
/// `replace` overwrites in place. There is no history stack: paging back
/// through every filter change is not useful navigation, so every write
/// lands on the same entry.
pub trait QueryStateStore: Send + Sync {
    /// The current query string, without a leading `?`.
    fn read(&self) -> String;

    /// Replaces the stored query string.
    fn replace(&self, query: &str);
}

// ---------------------------------------------------------------------------
// URL-backed store
// ---------------------------------------------------------------------------

/// Store backed by a full URL; only the query component changes.
///
/// Path and fragment survive every write. An empty query removes the `?`
/// entirely so copied links stay tidy.
pub struct UrlStateStore {
    url: RwLock<Url>,
}

impl UrlStateStore {
    /// Store rooted at an already-parsed URL.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url: RwLock::new(url),
        }
    }

    /// Store rooted at a URL string.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// The full URL as currently stored.
    #[must_use]
    pub fn current_url(&self) -> Url {
        self.url.read().clone()
    }
}

impl QueryStateStore for UrlStateStore {
    fn read(&self) -> String {
        self.url.read().query().unwrap_or_default().to_string()
    }

    fn replace(&self, query: &str) {
        let mut url = self.url.write();
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(query));
        }
    }
}

// ---------------------------------------------------------------------------
// Memory-backed store
// ---------------------------------------------------------------------------

/// Store holding just the query string, for views without URL sync.
#[derive(Default)]
pub struct MemoryStateStore {
    query: RwLock<String>,
}

impl MemoryStateStore {
    /// Empty store (all query defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with a query string.
    #[must_use]
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: RwLock::new(query.into()),
        }
    }
}

impl QueryStateStore for MemoryStateStore {
    fn read(&self) -> String {
        self.query.read().clone()
    }

    fn replace(&self, query: &str) {
        *self.query.write() = query.to_string();
    }
}
