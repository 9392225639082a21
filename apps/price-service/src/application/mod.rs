//! Application Layer - Ports, decorators and request dispatch.
//!
//! This layer defines the price service contract and composes the
//! cross-cutting behaviors around it. It knows nothing about HTTP or gRPC.

/// Port interfaces (price service, fetch logger, metrics sink).
pub mod ports;

/// Decorators, chain builder and dispatcher.
pub mod services;
