//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer, plus both transport adapters.

/// Configuration loaded from the environment.
pub mod config;

/// JSON HTTP API (axum).
pub mod http;

/// gRPC service (tonic) and demo poller.
pub mod grpc;

/// Listener binding and server errors.
pub mod listener;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Static and CoinMarketCap price sources.
pub mod price_source;

/// Logging and OpenTelemetry tracing integration.
pub mod telemetry;
