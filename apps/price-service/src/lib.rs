#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Price Service - Ticker Price Lookup
//!
//! Serves one capability, "fetch the price for a ticker", over a JSON HTTP
//! API and a gRPC service. Both transports share a single price service
//! wrapped in cross-cutting decorators.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Value types and per-request context
//!   - `pricing`: Ticker, price, quote and error taxonomy
//!   - `context`: Correlation id, transport and cancellation
//!
//! - **Application**: Ports and composition
//!   - `ports`: `PriceService`, `FetchLogger`, `MetricsSink`
//!   - `services`: Decorators, chain builder, fetch dispatcher
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `price_source`: Static table and CoinMarketCap sources
//!   - `http`: JSON API (axum)
//!   - `grpc`: `price.v1.PriceFetcher` (tonic) and demo poller
//!   - `config`, `telemetry`, `metrics`: ambient concerns
//!
//! # Request Flow
//!
//! ```text
//! HTTP  GET /?ticker=X ──┐
//!                        ├──► FetchDispatcher ──► Logging ──► Metrics ──► Source
//! gRPC  FetchPrice(X) ───┘      (context,
//!                                deadline,
//!                                cancellation)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core pricing types with no transport dependencies.
pub mod domain;

/// Application layer - Ports, decorators and dispatch.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::context::{CorrelationId, RequestContext, Transport};
pub use domain::pricing::{Price, PriceError, PriceQuote, Ticker};

// Ports and services
pub use application::ports::{FetchLogger, FetchRecord, MetricsSink, PriceService, SharedPriceService};
pub use application::services::{
    DEFAULT_REQUEST_TIMEOUT, Dispatched, FetchDispatcher, LoggingService, MetricsService,
    ServiceChain, standard_chain,
};

// Infrastructure config
pub use infrastructure::config::{
    ApiKey, ConfigError, PollerSettings, ServerSettings, ServiceConfig, SourceKind,
    UpstreamSettings,
};

// Price sources
pub use infrastructure::price_source::{
    COINMARKETCAP_BASE_URL, CoinMarketCapSource, SourceInitError, StaticPriceSource, build_source,
};

// Transports
pub use infrastructure::grpc::{
    GrpcServer, PriceGrpcService, PricePoller, REQUEST_ID_METADATA, proto::price::v1 as proto,
};
pub use infrastructure::http::{ErrorBody, HttpServer, REQUEST_ID_HEADER, create_router};
pub use infrastructure::listener::ServerError;

// Metrics
pub use infrastructure::metrics::{PrometheusMetricsSink, get_metrics_handle, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{
    TelemetryConfig, TelemetryGuard, TracingFetchLogger, init as init_telemetry,
};
