//! CoinMarketCap price source.
//!
//! Calls the `quotes/latest` endpoint for one symbol and reads the USD quote.
//! The outbound call races the request's cancellation token, so a cancelled
//! inbound request stops waiting on the upstream immediately.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::SourceInitError;
use crate::application::ports::PriceService;
use crate::domain::context::RequestContext;
use crate::domain::pricing::{Price, PriceError, Ticker};
use crate::infrastructure::config::ApiKey;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://pro-api.coinmarketcap.com";

const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
const QUOTE_CURRENCY: &str = "USD";

/// Price source backed by the CoinMarketCap API.
#[derive(Debug)]
pub struct CoinMarketCapSource {
    client: Client,
    api_key: ApiKey,
    quotes_url: String,
}

impl CoinMarketCapSource {
    /// Create a new source.
    ///
    /// # Errors
    ///
    /// Returns `SourceInitError` if the key is empty or the HTTP client
    /// cannot be built.
    pub fn new(api_key: ApiKey, base_url: &str, timeout: Duration) -> Result<Self, SourceInitError> {
        if api_key.expose().is_empty() {
            return Err(SourceInitError::EmptyApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceInitError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            quotes_url: format!("{}{QUOTES_PATH}", base_url.trim_end_matches('/')),
        })
    }

    async fn request_price(&self, ticker: &Ticker) -> Result<Price, PriceError> {
        let response = self
            .client
            .get(&self.quotes_url)
            .query(&[("symbol", ticker.as_str())])
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, ticker = %ticker, "Upstream request failed");
                PriceError::UpstreamFailure("failed to reach upstream price API".to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PriceError::UpstreamFailure(format!(
                "unexpected status code: {}",
                status.as_u16()
            )));
        }

        let payload: QuotesResponse = response.json().await.map_err(|e| {
            tracing::debug!(error = %e, ticker = %ticker, "Upstream payload did not decode");
            PriceError::UpstreamFailure("failed to decode upstream response".to_string())
        })?;

        extract_price(&payload, ticker)
    }
}

#[async_trait]
impl PriceService for CoinMarketCapSource {
    async fn fetch_price(
        &self,
        ctx: &RequestContext,
        ticker: &Ticker,
    ) -> Result<Price, PriceError> {
        if ctx.is_cancelled() {
            return Err(PriceError::Cancelled);
        }

        tokio::select! {
            biased;
            () = ctx.cancelled() => Err(PriceError::Cancelled),
            result = self.request_price(ticker) => result,
        }
    }
}

fn extract_price(payload: &QuotesResponse, ticker: &Ticker) -> Result<Price, PriceError> {
    let entry = payload
        .data
        .get(ticker.as_str())
        .ok_or_else(|| PriceError::UnsupportedTicker(ticker.clone()))?;

    entry
        .quote
        .get(QUOTE_CURRENCY)
        .and_then(|quote| quote.price)
        .and_then(Price::new)
        .ok_or_else(|| PriceError::MalformedUpstreamPayload(ticker.clone()))
}

// API response types

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default)]
    data: HashMap<String, CoinEntry>,
}

#[derive(Debug, Deserialize)]
struct CoinEntry {
    #[serde(default)]
    quote: HashMap<String, CurrencyQuote>,
}

#[derive(Debug, Deserialize)]
struct CurrencyQuote {
    #[serde(default)]
    price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QuotesResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn extracts_usd_price() {
        let payload = parse(r#"{"data":{"BTC":{"quote":{"USD":{"price":27123.5}}}}}"#);
        let price = extract_price(&payload, &Ticker::new("BTC")).unwrap();
        assert_eq!(price.value(), 27_123.5);
    }

    #[test]
    fn missing_ticker_is_unsupported() {
        let payload = parse(r#"{"data":{}}"#);
        assert_eq!(
            extract_price(&payload, &Ticker::new("DOGE")),
            Err(PriceError::UnsupportedTicker(Ticker::new("DOGE")))
        );
    }

    #[test]
    fn missing_data_is_unsupported() {
        let payload = parse(r#"{"status":{"error_code":0}}"#);
        assert!(matches!(
            extract_price(&payload, &Ticker::new("BTC")),
            Err(PriceError::UnsupportedTicker(_))
        ));
    }

    #[test]
    fn missing_currency_is_malformed() {
        let payload = parse(r#"{"data":{"BTC":{"quote":{"EUR":{"price":1.0}}}}}"#);
        assert_eq!(
            extract_price(&payload, &Ticker::new("BTC")),
            Err(PriceError::MalformedUpstreamPayload(Ticker::new("BTC")))
        );
    }

    #[test]
    fn null_or_negative_price_is_malformed() {
        let null = parse(r#"{"data":{"BTC":{"quote":{"USD":{"price":null}}}}}"#);
        let negative = parse(r#"{"data":{"BTC":{"quote":{"USD":{"price":-3.0}}}}}"#);
        let btc = Ticker::new("BTC");
        assert!(matches!(
            extract_price(&null, &btc),
            Err(PriceError::MalformedUpstreamPayload(_))
        ));
        assert!(matches!(
            extract_price(&negative, &btc),
            Err(PriceError::MalformedUpstreamPayload(_))
        ));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = CoinMarketCapSource::new(
            ApiKey::new(String::new()),
            DEFAULT_BASE_URL,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(SourceInitError::EmptyApiKey)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let source = CoinMarketCapSource::new(
            ApiKey::new("key".to_string()),
            "http://localhost:9999/",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            source.quotes_url,
            "http://localhost:9999/v1/cryptocurrency/quotes/latest"
        );
    }
}
