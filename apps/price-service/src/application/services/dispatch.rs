//! Fetch Dispatcher
//!
//! Shared entry point for both transport adapters. For every inbound request
//! it creates the `RequestContext`, runs the decorated service on its own
//! task, and ties the context's cancellation token to the lifetime of the
//! inbound request.
//!
//! The chain runs on a detached task so that a dropped inbound future (client
//! disconnect) or an elapsed deadline cancels the token instead of tearing the
//! chain down mid-call. The price source sees the cancellation, returns
//! `PriceError::Cancelled`, and the logging decorator still records the call.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::SharedPriceService;
use crate::domain::context::{CorrelationId, RequestContext, Transport};
use crate::domain::pricing::{PriceError, PriceQuote, Ticker};

/// Default deadline for a single price request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    /// Correlation id assigned to the request.
    pub correlation_id: CorrelationId,
    /// Quote or error returned by the chain.
    pub result: Result<PriceQuote, PriceError>,
}

/// Runs price requests against one shared decorated service.
#[derive(Clone)]
pub struct FetchDispatcher {
    service: SharedPriceService,
    timeout: Duration,
}

impl FetchDispatcher {
    /// Create a dispatcher over `service` with a per-request deadline.
    #[must_use]
    pub fn new(service: SharedPriceService, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    /// Handle one request arriving on `transport`.
    pub async fn dispatch(&self, transport: Transport, ticker: Ticker) -> Dispatched {
        self.dispatch_with(RequestContext::new(transport), ticker)
            .await
    }

    /// Handle one request with an explicit context.
    ///
    /// The context's token is cancelled when this future completes or is
    /// dropped.
    pub async fn dispatch_with(&self, ctx: RequestContext, ticker: Ticker) -> Dispatched {
        let correlation_id = ctx.correlation_id();
        let _cancel_on_exit = ctx.cancellation().clone().drop_guard();

        let service = Arc::clone(&self.service);
        let requested = ticker.clone();
        let task = tokio::spawn(async move { service.fetch_price(&ctx, &requested).await });

        let result = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result.map(|price| PriceQuote::new(ticker, price)),
            Ok(Err(join_error)) => {
                tracing::error!(
                    request_id = %correlation_id,
                    error = %join_error,
                    "Price lookup task failed"
                );
                Err(PriceError::Internal("price lookup failed".to_string()))
            }
            Err(_) => Err(PriceError::Timeout(self.timeout)),
        };

        Dispatched {
            correlation_id,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::application::ports::PriceService;
    use crate::domain::pricing::Price;

    /// Answers immediately with a fixed price.
    struct Immediate;

    #[async_trait]
    impl PriceService for Immediate {
        async fn fetch_price(
            &self,
            _ctx: &RequestContext,
            _ticker: &Ticker,
        ) -> Result<Price, PriceError> {
            Ok(Price::new(42.0).unwrap())
        }
    }

    /// Never answers; reports when it observes cancellation.
    struct Hanging(mpsc::UnboundedSender<CorrelationId>);

    #[async_trait]
    impl PriceService for Hanging {
        async fn fetch_price(
            &self,
            ctx: &RequestContext,
            _ticker: &Ticker,
        ) -> Result<Price, PriceError> {
            ctx.cancelled().await;
            let _ = self.0.send(ctx.correlation_id());
            Err(PriceError::Cancelled)
        }
    }

    /// Panics on every call.
    struct Exploding;

    #[async_trait]
    impl PriceService for Exploding {
        async fn fetch_price(
            &self,
            _ctx: &RequestContext,
            _ticker: &Ticker,
        ) -> Result<Price, PriceError> {
            panic!("boom")
        }
    }

    #[tokio::test]
    async fn dispatch_returns_quote_with_requested_ticker() {
        let dispatcher = FetchDispatcher::new(Arc::new(Immediate), DEFAULT_REQUEST_TIMEOUT);
        let dispatched = dispatcher.dispatch(Transport::Http, Ticker::new("BTC")).await;

        assert_eq!(
            dispatched.result,
            Ok(PriceQuote::new(Ticker::new("BTC"), Price::new(42.0).unwrap()))
        );
    }

    #[tokio::test]
    async fn dispatch_assigns_distinct_correlation_ids() {
        let dispatcher = FetchDispatcher::new(Arc::new(Immediate), DEFAULT_REQUEST_TIMEOUT);
        let a = dispatcher.dispatch(Transport::Http, Ticker::new("BTC")).await;
        let b = dispatcher.dispatch(Transport::Http, Ticker::new("BTC")).await;

        assert_ne!(a.correlation_id, b.correlation_id);
    }

    #[tokio::test]
    async fn timeout_cancels_the_inner_call() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = FetchDispatcher::new(Arc::new(Hanging(tx)), Duration::from_millis(20));

        let dispatched = dispatcher.dispatch(Transport::Grpc, Ticker::new("BTC")).await;
        assert_eq!(
            dispatched.result,
            Err(PriceError::Timeout(Duration::from_millis(20)))
        );

        let observed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(observed, Some(dispatched.correlation_id));
    }

    #[tokio::test]
    async fn dropping_the_request_cancels_the_inner_call() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = FetchDispatcher::new(Arc::new(Hanging(tx)), DEFAULT_REQUEST_TIMEOUT);

        let ctx = RequestContext::with_correlation_id(
            CorrelationId::generate(),
            Transport::Http,
            CancellationToken::new(),
        );
        let expected = ctx.correlation_id();

        let request = tokio::spawn(async move {
            dispatcher.dispatch_with(ctx, Ticker::new("BTC")).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        request.abort();

        let observed = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(observed, Some(expected));
    }

    #[tokio::test]
    async fn panicking_source_is_reported_as_internal() {
        let dispatcher = FetchDispatcher::new(Arc::new(Exploding), DEFAULT_REQUEST_TIMEOUT);
        let dispatched = dispatcher.dispatch(Transport::Http, Ticker::new("BTC")).await;

        assert_eq!(
            dispatched.result,
            Err(PriceError::Internal("price lookup failed".to_string()))
        );
    }
}
