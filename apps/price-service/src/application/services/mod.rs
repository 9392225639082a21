//! Application Services
//!
//! Services that compose the price service and drive it on behalf of the
//! transports.
//!
//! - `LoggingService` / `MetricsService`: cross-cutting decorators
//! - `ServiceChain`: builder that stacks decorators around a source
//! - `FetchDispatcher`: per-request context creation, cancellation and deadline

mod chain;
mod decorators;
mod dispatch;

pub use chain::{ServiceChain, standard_chain};
pub use decorators::{LoggingService, MetricsService};
pub use dispatch::{DEFAULT_REQUEST_TIMEOUT, Dispatched, FetchDispatcher};
