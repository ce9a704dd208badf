//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. The gap between `start()` and `serve()` is where the
//! binary learns the bound port and wires signal handling.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use super::config::NetworkConfig;
use super::docs::ApiDoc;
use super::handlers::health::{health_handler, liveness_handler, readiness_handler};
use super::handlers::{cafes, facilities, reviews, terms, AppState};
use super::metrics::HttpMetricsLayer;
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::catalog::Catalog;

/// How long `serve()` waits for in-flight requests after the shutdown
/// signal fires.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Manages the full HTTP server lifecycle.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- takes the seeded catalog and allocates shared state
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    catalog: Catalog,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, catalog: Catalog) -> Self {
        Self {
            config,
            listener: None,
            catalog,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the shutdown controller.
    ///
    /// The binary uses this to trigger shutdown from signal handlers.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /health`, `/health/live`, `/health/ready` -- probes
    /// - `/api/cafes`, `/api/reviews`, `/api/facilities`, `/api/terms`
    ///   -- the resource API (rate limited)
    /// - `GET /docs` -- Swagger UI over the generated OpenAPI document
    #[must_use]
    pub fn build_router(&self) -> Router {
        assemble_router(
            &self.config,
            self.catalog.clone(),
            Arc::clone(&self.shutdown),
        )
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Starts serving connections until the shutdown signal fires.
    ///
    /// Consumes `self` because the listener is moved into the server.
    ///
    /// After the shutdown signal:
    /// 1. Health state transitions to Draining
    /// 2. Waits up to 30 seconds for in-flight requests to complete
    /// 3. Health state transitions to Stopped
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let shutdown_ctrl = self.shutdown;
        let config = self.config;

        let router = assemble_router(&config, self.catalog, Arc::clone(&shutdown_ctrl));

        // Transition to Ready so readiness probes pass.
        shutdown_ctrl.set_ready();

        if let Some(ref tls_config) = config.tls {
            serve_tls(listener, router, tls_config, shutdown_ctrl, shutdown).await
        } else {
            serve_plain(listener, router, shutdown_ctrl, shutdown).await
        }
    }
}

/// The resource routes, paired with their OpenAPI path entries.
fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(cafes::list_cafes, cafes::create_cafe))
        .routes(routes!(cafes::get_cafe, cafes::update_cafe, cafes::delete_cafe))
        .routes(routes!(reviews::list_reviews, reviews::create_review))
        .routes(routes!(reviews::archive_review))
        .routes(routes!(
            facilities::list_facilities,
            facilities::create_facility
        ))
        .routes(routes!(facilities::delete_facility))
        .routes(routes!(terms::list_terms, terms::create_term))
}

/// Builds the complete router: probes, rate-limited API, Swagger UI,
/// metrics, and the transport middleware stack.
fn assemble_router(
    config: &NetworkConfig,
    catalog: Catalog,
    shutdown: Arc<ShutdownController>,
) -> Router {
    let state = AppState::new(catalog, shutdown, Arc::new(config.clone()));

    let (api, openapi) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(api_routes())
        .split_for_parts();

    // Rate limiting keys on the peer IP, so the server must be driven
    // through `into_make_service_with_connect_info`. Probes and docs sit
    // outside the limiter.
    let api = match GovernorConfigBuilder::default()
        .per_second(config.rate_limit.replenish_interval_secs)
        .burst_size(config.rate_limit.burst_size)
        .finish()
    {
        Some(governor) => api.layer(GovernorLayer {
            config: Arc::new(governor),
        }),
        None => {
            warn!("invalid rate limit configuration, public API is unthrottled");
            api
        }
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi))
        .layer(HttpMetricsLayer)
        .layer(build_http_layers(config))
        .with_state(state)
}

/// Serves plain HTTP connections using axum's built-in server.
async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown_ctrl: Arc<ShutdownController>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Serving plain HTTP connections");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    drain(shutdown_ctrl).await;
    Ok(())
}

/// Serves TLS connections using `axum-server` with rustls.
///
/// Reuses the pre-bound TCP listener by converting it to a `std::net::TcpListener`.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &super::config::TlsConfig,
    shutdown_ctrl: Arc<ShutdownController>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    // Wait for the shutdown signal and trigger graceful shutdown on the
    // axum-server handle.
    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!("Serving TLS connections on {}", addr);

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service_with_connect_info::<SocketAddr>())
        .await?;

    drain(shutdown_ctrl).await;
    Ok(())
}

/// Transitions to Draining, waits out in-flight requests, then Stopped.
async fn drain(shutdown_ctrl: Arc<ShutdownController>) {
    shutdown_ctrl.trigger_shutdown();

    let drained = shutdown_ctrl.wait_for_drain(DRAIN_TIMEOUT).await;
    if drained {
        info!("All in-flight requests drained");
    } else {
        warn!(
            in_flight = shutdown_ctrl.in_flight_count(),
            "Drain timeout expired with requests remaining"
        );
    }
}
