//! Ngopi Client -- query state synchronization, deduplicated fetching,
//! and cached list views over the Ngopi HTTP API.
//!
//! The shape of a list screen: a [`QuerySync`] keeps the canonical query
//! in its state store (the address bar or local memory), a [`FetchCache`]
//! turns queries into deduplicated HTTP fetches, and a
//! [`ResourceList`] folds both into a snapshot the UI renders.

pub mod cache;
pub mod debounce;
pub mod error;
pub mod list;
pub mod store;
pub mod sync;
pub mod transport;

pub use cache::{CachedPage, FetchCache, FetchResult};
pub use error::ClientError;
pub use list::{ListSnapshot, ResourceList};
pub use store::{MemoryStateStore, QueryStateStore, UrlStateStore};
pub use sync::QuerySync;
pub use transport::{HttpTransport, Transport};
