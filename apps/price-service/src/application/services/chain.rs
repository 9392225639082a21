//! Service Chain Builder
//!
//! Composes a base price source with decorators. Each `wrap` call puts a new
//! decorator outside everything added so far, so the last wrap is the
//! outermost link. `build` freezes the chain into a shared handle.

use std::sync::Arc;

use super::decorators::{LoggingService, MetricsService};
use crate::application::ports::{FetchLogger, MetricsSink, PriceService, SharedPriceService};

/// Builder for a decorated `PriceService`.
pub struct ServiceChain {
    inner: SharedPriceService,
}

impl ServiceChain {
    /// Start a chain from a base source.
    #[must_use]
    pub fn new(source: impl PriceService + 'static) -> Self {
        Self {
            inner: Arc::new(source),
        }
    }

    /// Start a chain from an already shared source.
    #[must_use]
    pub const fn from_shared(source: SharedPriceService) -> Self {
        Self { inner: source }
    }

    /// Wrap the current chain in another decorator.
    #[must_use]
    pub fn wrap<D, F>(self, decorate: F) -> Self
    where
        D: PriceService + 'static,
        F: FnOnce(SharedPriceService) -> D,
    {
        Self {
            inner: Arc::new(decorate(self.inner)),
        }
    }

    /// Finish the chain.
    #[must_use]
    pub fn build(self) -> SharedPriceService {
        self.inner
    }
}

/// Build the production chain: logging → metrics → source.
#[must_use]
pub fn standard_chain(
    source: SharedPriceService,
    logger: Arc<dyn FetchLogger>,
    metrics: Arc<dyn MetricsSink>,
) -> SharedPriceService {
    ServiceChain::from_shared(source)
        .wrap(|next| MetricsService::new(next, metrics))
        .wrap(|next| LoggingService::new(next, logger))
        .build()
}
