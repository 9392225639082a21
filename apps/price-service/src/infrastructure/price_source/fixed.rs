//! Fixed-value price source for demos and tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::application::ports::PriceService;
use crate::domain::context::RequestContext;
use crate::domain::pricing::{Price, PriceError, Ticker};

/// Default table served by `StaticPriceSource::default()`.
const DEFAULT_PRICES: [(&str, f64); 2] = [("BTC", 20_000.0), ("ETH", 200.0)];

/// Price source backed by an in-memory table.
#[derive(Debug, Clone)]
pub struct StaticPriceSource {
    prices: HashMap<String, Price>,
}

impl StaticPriceSource {
    /// Create a source serving exactly the given prices.
    #[must_use]
    pub fn with_prices<I, T>(prices: I) -> Self
    where
        I: IntoIterator<Item = (T, Price)>,
        T: Into<String>,
    {
        Self {
            prices: prices
                .into_iter()
                .map(|(ticker, price)| (ticker.into(), price))
                .collect(),
        }
    }

    /// Whether the ticker is in the table.
    #[must_use]
    pub fn knows(&self, ticker: &Ticker) -> bool {
        self.prices.contains_key(ticker.as_str())
    }

    /// Tickers in the table, unordered.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.prices.keys().map(String::as_str)
    }
}

impl Default for StaticPriceSource {
    fn default() -> Self {
        Self::with_prices(
            DEFAULT_PRICES
                .iter()
                .filter_map(|&(ticker, value)| Price::new(value).map(|price| (ticker, price))),
        )
    }
}

#[async_trait]
impl PriceService for StaticPriceSource {
    async fn fetch_price(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Price, PriceError> {
        if ctx.is_cancelled() {
            return Err(PriceError::Cancelled);
        }

        self.prices
            .get(ticker.as_str())
            .copied()
            .ok_or_else(|| PriceError::UnsupportedTicker(ticker.clone()))
    }
}
