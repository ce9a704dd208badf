//! Ngopi API server binary.
//!
//! Wires configuration from flags and environment, installs tracing and
//! the Prometheus exporter, seeds the demo catalog, and runs the network
//! module until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use ngopi_server::catalog::{seed, Catalog};
use ngopi_server::network::{NetworkConfig, NetworkModule, RateLimitConfig, TlsConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line options. Every flag can also come from the environment.
#[derive(Debug, Parser)]
#[command(
    name = "ngopi-server",
    about = "HTTP API over the cafe catalog",
    version
)]
struct Cli {
    /// Bind address.
    #[arg(long, env = "NGOPI_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on; 0 asks the OS for an ephemeral port.
    #[arg(long, env = "NGOPI_PORT", default_value_t = 8080)]
    port: u16,

    /// Comma-separated list of allowed CORS origins; `*` allows any.
    #[arg(
        long,
        env = "NGOPI_CORS_ORIGINS",
        default_value = "*",
        value_delimiter = ','
    )]
    cors_origins: Vec<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "NGOPI_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    #[arg(long, env = "NGOPI_MAX_BODY_BYTES", default_value_t = 65_536)]
    max_body_bytes: usize,

    /// Rate limiter: seconds to earn back one request.
    #[arg(long, env = "NGOPI_RATE_REPLENISH_SECS", default_value_t = 1)]
    rate_replenish_secs: u64,

    /// Rate limiter: burst allowance per client.
    #[arg(long, env = "NGOPI_RATE_BURST", default_value_t = 50)]
    rate_burst: u32,

    /// Bearer token for the admin mutation routes; omit to disable them.
    #[arg(long, env = "NGOPI_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// TLS certificate path (PEM). Requires --tls-key.
    #[arg(long, env = "NGOPI_TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    /// TLS private key path (PEM). Requires --tls-cert.
    #[arg(long, env = "NGOPI_TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    /// Prometheus scrape listener, e.g. 0.0.0.0:9100. Omit to disable.
    #[arg(long, env = "NGOPI_METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,

    /// Emit logs as JSON instead of human-readable lines.
    #[arg(long, env = "NGOPI_LOG_JSON")]
    log_json: bool,

    /// Start with an empty catalog instead of the demo data set.
    #[arg(long, env = "NGOPI_NO_SEED")]
    no_seed: bool,
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        let tls = match (&self.tls_cert, &self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path: cert_path.clone(),
                key_path: key_path.clone(),
            }),
            _ => None,
        };

        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            tls,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_body_bytes: self.max_body_bytes,
            rate_limit: RateLimitConfig {
                replenish_interval_secs: self.rate_replenish_secs,
                burst_size: self.rate_burst,
            },
            admin_token: self.admin_token.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_json);

    if let Some(addr) = cli.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {e}"))?;
        info!("Prometheus scrape endpoint on {addr}");
    }

    let catalog = if cli.no_seed {
        Catalog::empty()
    } else {
        seed::demo()
    };
    info!(
        cafes = catalog.cafes.len(),
        reviews = catalog.reviews.len(),
        facilities = catalog.facilities.len(),
        terms = catalog.terms.len(),
        "catalog loaded"
    );

    let mut module = NetworkModule::new(cli.network_config(), catalog);
    let port = module.start().await?;
    info!("Ngopi API listening on port {port}");

    module.serve(shutdown_signal()).await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
