//! Price Service Decorators
//!
//! Wrappers that add one cross-cutting behavior around a delegate
//! `PriceService`. Each decorator owns exactly one `next` link and one
//! collaborator, stores no call data, and forwards the inner result
//! unchanged.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::application::ports::{
    FetchLogger, FetchRecord, MetricsSink, PriceService, SharedPriceService,
};
use crate::domain::context::RequestContext;
use crate::domain::pricing::{Price, PriceError, Ticker};

// =============================================================================
// Logging
// =============================================================================

/// Emits one `FetchRecord` per call, after the wrapped call returns.
pub struct LoggingService {
    next: SharedPriceService,
    logger: Arc<dyn FetchLogger>,
}

impl LoggingService {
    /// Wrap `next`, sending records to `logger`.
    #[must_use]
    pub fn new(next: SharedPriceService, logger: Arc<dyn FetchLogger>) -> Self {
        Self { next, logger }
    }
}

#[async_trait]
impl PriceService for LoggingService {
    async fn fetch_price(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Price, PriceError> {
        let started = Instant::now();
        let result = self.next.fetch_price(ctx, ticker).await;

        let record = FetchRecord {
            correlation_id: ctx.correlation_id(),
            transport: ctx.transport(),
            ticker: ticker.clone(),
            price: result.as_ref().ok().copied().unwrap_or(Price::ZERO),
            elapsed: started.elapsed(),
            error: result.as_ref().err().cloned(),
        };
        self.logger.log_fetch(&record);

        result
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Emits one invocation event per call, before delegating.
pub struct MetricsService {
    next: SharedPriceService,
    sink: Arc<dyn MetricsSink>,
}

impl MetricsService {
    /// Wrap `next`, sending events to `sink`.
    #[must_use]
    pub fn new(next: SharedPriceService, sink: Arc<dyn MetricsSink>) -> Self {
        Self { next, sink }
    }
}

#[async_trait]
impl PriceService for MetricsService {
    async fn fetch_price(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Price, PriceError> {
        self.sink.record_invocation(ctx, ticker);
        self.next.fetch_price(ctx, ticker).await
    }
}

// =============================================================================
// Tests
// =============================================================================
