//! Price Service Binary
//!
//! Starts the JSON HTTP API and the gRPC service over one decorated price
//! service.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin price-service
//! ```
//!
//! # Environment Variables
//!
//! - `PRICE_HTTP_ADDR`: JSON API address (default: 0.0.0.0:3000)
//! - `PRICE_GRPC_ADDR`: gRPC address (default: 0.0.0.0:4000)
//! - `PRICE_SOURCE`: static | coinmarketcap (default: coinmarketcap if
//!   `CMC_API_KEY` is set, else static)
//! - `CMC_API_KEY`: CoinMarketCap API key
//! - `CMC_BASE_URL`: CoinMarketCap base URL (default: <https://pro-api.coinmarketcap.com>)
//! - `CMC_TIMEOUT_MS`: Upstream HTTP timeout (default: 5000)
//! - `PRICE_REQUEST_TIMEOUT_MS`: Per-request deadline (default: 10000)
//! - `PRICE_POLL_INTERVAL_SECS`: Demo poller interval, 0 disables (default: 0)
//! - `PRICE_POLL_TICKER`: Demo poller ticker (default: BTC)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: price-service)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context as _;
use price_service::{
    FetchDispatcher, GrpcServer, HttpServer, PricePoller, PrometheusMetricsSink, ServiceConfig,
    TracingFetchLogger, build_source, init_metrics, init_telemetry, standard_chain,
};
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_ancestors();

    let _telemetry_guard = init_telemetry().context("failed to initialize telemetry")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting price service");

    init_metrics().context("failed to install Prometheus recorder")?;

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let source = build_source(config.source, &config.upstream)
        .context("failed to build price source")?;
    let service = standard_chain(
        source,
        Arc::new(TracingFetchLogger),
        Arc::new(PrometheusMetricsSink),
    );
    let dispatcher = FetchDispatcher::new(service, config.request_timeout);

    let shutdown_token = CancellationToken::new();
    let mut tasks = JoinSet::new();

    let http_server = HttpServer::new(
        config.server.http_addr,
        dispatcher.clone(),
        shutdown_token.clone(),
    );
    let http_shutdown = shutdown_token.clone();
    tasks.spawn(async move {
        if let Err(e) = http_server.run().await {
            tracing::error!(error = %e, "HTTP server error");
            http_shutdown.cancel();
        }
    });

    let grpc_server = GrpcServer::new(
        config.server.grpc_addr,
        dispatcher,
        shutdown_token.clone(),
    );
    let grpc_shutdown = shutdown_token.clone();
    tasks.spawn(async move {
        if let Err(e) = grpc_server.run().await {
            tracing::error!(error = %e, "gRPC server error");
            grpc_shutdown.cancel();
        }
    });

    if config.poller.is_enabled() {
        let poller = PricePoller::new(
            config.server.grpc_addr,
            config.poller.ticker.clone(),
            config.poller.interval,
            shutdown_token.clone(),
        )
        .context("failed to create price poller")?;
        tasks.spawn(poller.run());
    }

    tracing::info!("Price service ready");

    tokio::select! {
        () = await_shutdown_signal() => {}
        () = shutdown_token.cancelled() => {
            tracing::warn!("A server stopped unexpectedly, shutting down");
        }
    }
    shutdown_token.cancel();

    while tasks.join_next().await.is_some() {}

    tracing::info!("Price service stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &ServiceConfig) {
    tracing::info!(
        http_addr = %config.server.http_addr,
        grpc_addr = %config.server.grpc_addr,
        source = config.source.as_str(),
        request_timeout_ms = u64::try_from(config.request_timeout.as_millis()).unwrap_or(u64::MAX),
        poller_enabled = config.poller.is_enabled(),
        "Configuration loaded"
    );
    tracing::debug!(
        base_url = %config.upstream.base_url,
        upstream_timeout_ms = u64::try_from(config.upstream.timeout.as_millis()).unwrap_or(u64::MAX),
        "Upstream settings"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
