//! Domain Layer - Core pricing types with no transport dependencies.
//!
//! This layer holds the value types shared by every other layer: tickers,
//! prices, quotes, the error taxonomy, and the per-request context.

/// Ticker, price, quote and error types.
pub mod pricing;

/// Per-request context (correlation id, transport, cancellation).
pub mod context;
