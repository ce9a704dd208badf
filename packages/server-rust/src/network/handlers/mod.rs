//! HTTP request handlers for the Ngopi API.

pub mod cafes;
pub mod error;
pub mod facilities;
pub mod health;
pub mod reviews;
pub mod terms;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Instant;

use ngopi_core::resources;

use crate::catalog::{Cafe, Catalog, Facility, Review, Term};
use crate::network::config::NetworkConfig;
use crate::network::shutdown::ShutdownController;
use crate::repository::Repository;
use crate::traits::DataSource;

/// Shared state injected into every handler.
///
/// The repositories and the catalog wrap the same underlying stores:
/// reads go through a [`Repository`] so list queries keep their two-read
/// contract, writes go straight to the catalog collections.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub cafes: Arc<Repository<Cafe>>,
    pub reviews: Arc<Repository<Review>>,
    pub facilities: Arc<Repository<Facility>>,
    pub terms: Arc<Repository<Term>>,
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    pub start_time: Instant,
}

impl AppState {
    /// Wires repositories for each resource over the given catalog.
    #[must_use]
    pub fn new(
        catalog: Catalog,
        shutdown: Arc<ShutdownController>,
        config: Arc<NetworkConfig>,
    ) -> Self {
        let cafes = Arc::new(Repository::new(
            &resources::CAFES,
            Arc::clone(&catalog.cafes) as Arc<dyn DataSource<Cafe>>,
        ));
        let reviews = Arc::new(Repository::new(
            &resources::REVIEWS,
            Arc::clone(&catalog.reviews) as Arc<dyn DataSource<Review>>,
        ));
        let facilities = Arc::new(Repository::new(
            &resources::FACILITIES,
            Arc::clone(&catalog.facilities) as Arc<dyn DataSource<Facility>>,
        ));
        let terms = Arc::new(Repository::new(
            &resources::TERMS,
            Arc::clone(&catalog.terms) as Arc<dyn DataSource<Term>>,
        ));

        Self {
            catalog,
            cafes,
            reviews,
            facilities,
            terms,
            shutdown,
            config,
            start_time: Instant::now(),
        }
    }
}

/// Milliseconds since the Unix epoch, the timestamp unit all records use.
pub(crate) fn now_millis() -> i64 {
    let elapsed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repositories_share_catalog_stores() {
        let state = AppState::new(
            crate::catalog::seed::demo(),
            Arc::new(ShutdownController::new()),
            Arc::new(NetworkConfig::default()),
        );

        // A record inserted through the catalog is visible to the
        // repository wired over the same store.
        let before = state.catalog.cafes.len();
        assert!(before > 0);
    }

    #[test]
    fn now_millis_is_after_2025() {
        assert!(now_millis() > 1_735_689_600_000);
    }
}
