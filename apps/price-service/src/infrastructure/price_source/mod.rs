//! Price Source Adapters
//!
//! Base implementations of `PriceService` that sit at the inner end of the
//! decorator chain.

pub mod coinmarketcap;
pub mod fixed;

use std::sync::Arc;

pub use coinmarketcap::{CoinMarketCapSource, DEFAULT_BASE_URL as COINMARKETCAP_BASE_URL};
pub use fixed::StaticPriceSource;

use crate::application::ports::SharedPriceService;
use crate::infrastructure::config::{SourceKind, UpstreamSettings};

/// Errors raised while constructing a price source.
#[derive(Debug, thiserror::Error)]
pub enum SourceInitError {
    /// The upstream API key is missing or empty.
    #[error("upstream API key cannot be empty")]
    EmptyApiKey,

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Build the configured base source.
///
/// # Errors
///
/// Returns `SourceInitError` if the CoinMarketCap source is selected without
/// a usable key or its HTTP client cannot be built.
pub fn build_source(
    kind: SourceKind,
    upstream: &UpstreamSettings,
) -> Result<SharedPriceService, SourceInitError> {
    match kind {
        SourceKind::Static => Ok(Arc::new(StaticPriceSource::default())),
        SourceKind::CoinMarketCap => {
            let api_key = upstream
                .api_key
                .clone()
                .ok_or(SourceInitError::EmptyApiKey)?;
            let source = CoinMarketCapSource::new(api_key, &upstream.base_url, upstream.timeout)?;
            Ok(Arc::new(source))
        }
    }
}
