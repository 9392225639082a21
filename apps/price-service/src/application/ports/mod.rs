//! Port Interfaces
//!
//! Defines the interfaces (ports) between the price service core and the
//! outside world, following the Hexagonal Architecture pattern.
//!
//! ## Driver Port (Inbound)
//!
//! - `PriceService`: the single-method capability both transports call.
//!   Price sources and every decorator implement it.
//!
//! ## Driven Ports (Outbound)
//!
//! - `FetchLogger`: receives one structured record per fetch
//! - `MetricsSink`: receives one invocation event per fetch

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::context::{CorrelationId, RequestContext, Transport};
use crate::domain::pricing::{Price, PriceError, Ticker};

// =============================================================================
// Price Service
// =============================================================================

/// Capability that resolves a ticker to a price.
///
/// Implementations must leave the ticker untouched and must not replace a
/// successful inner price with a different one.
#[async_trait]
pub trait PriceService: Send + Sync {
    /// Fetch the current price for `ticker`.
    async fn fetch_price(&self, ctx: &RequestContext, ticker: &Ticker)
    -> Result<Price, PriceError>;
}

/// Shared handle to a (possibly decorated) price service.
pub type SharedPriceService = Arc<dyn PriceService>;

// =============================================================================
// Fetch Logging
// =============================================================================

/// Structured outcome of one fetch, handed to a `FetchLogger`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRecord {
    /// Correlation id of the inbound request.
    pub correlation_id: CorrelationId,
    /// Transport that received the request.
    pub transport: Transport,
    /// Ticker as requested.
    pub ticker: Ticker,
    /// Resulting price, `Price::ZERO` when the fetch failed.
    pub price: Price,
    /// Time spent in the wrapped call.
    pub elapsed: Duration,
    /// Error returned by the wrapped call, if any.
    pub error: Option<PriceError>,
}

impl FetchRecord {
    /// Whether the recorded fetch succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Sink for fetch records. Must not block.
#[cfg_attr(test, mockall::automock)]
pub trait FetchLogger: Send + Sync {
    /// Emit one record.
    fn log_fetch(&self, record: &FetchRecord);
}

// =============================================================================
// Metrics
// =============================================================================

/// Sink for fetch invocation events. Must not block.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsSink: Send + Sync {
    /// Record that a fetch was invoked.
    fn record_invocation(&self, ctx: &RequestContext, ticker: &Ticker);
}
