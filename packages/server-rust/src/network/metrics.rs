//! HTTP metrics middleware.
//!
//! Records one counter increment and one latency sample per completed
//! request through the `metrics` facade. The Prometheus exporter the
//! binary installs turns these into a scrape endpoint; without a
//! recorder the macros are no-ops, so tests run clean.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::response::Response;
use tower::{Layer, Service};

/// Counter of finished requests, labelled by method, route, and status.
pub const REQUESTS_TOTAL: &str = "ngopi_http_requests_total";
/// Histogram of request latency in seconds, labelled by method and route.
pub const REQUEST_DURATION_SECONDS: &str = "ngopi_http_request_duration_seconds";

// ---------------------------------------------------------------------------
// HttpMetricsLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps route services in [`HttpMetricsService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpMetricsLayer;

impl<S> Layer<S> for HttpMetricsLayer {
    type Service = HttpMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpMetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// HttpMetricsService
// ---------------------------------------------------------------------------

/// Service wrapper timing each request and counting its outcome.
#[derive(Debug, Clone)]
pub struct HttpMetricsService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for HttpMetricsService<S>
where
    S: Service<Request<Body>, Response = Response> + Send,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().as_str().to_string();
        // Label by the matched route template, not the raw path, to keep
        // metric cardinality bounded.
        let route = req.extensions().get::<MatchedPath>().map_or_else(
            || "unmatched".to_string(),
            |path| path.as_str().to_string(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let start = Instant::now();
            let result = fut.await;
            let elapsed = start.elapsed();

            let status = result.as_ref().map_or_else(
                |_| "error".to_string(),
                |response| response.status().as_u16().to_string(),
            );

            metrics::counter!(
                REQUESTS_TOTAL,
                "method" => method.clone(),
                "route" => route.clone(),
                "status" => status
            )
            .increment(1);
            metrics::histogram!(
                REQUEST_DURATION_SECONDS,
                "method" => method,
                "route" => route
            )
            .record(elapsed.as_secs_f64());

            result
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
