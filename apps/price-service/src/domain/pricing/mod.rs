//! Pricing Types
//!
//! Core value types for a price lookup: the ticker being priced, the price
//! itself, the quote pair returned to callers, and the error taxonomy shared
//! by every layer of the service.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Ticker
// =============================================================================

/// Short identifier for a priced asset (e.g. "BTC").
///
/// A ticker is opaque: it is neither validated nor normalized. An empty ticker
/// is a legal value and is left to the price source to reject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Create a ticker from any string-like value, unchanged.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the ticker string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Check whether the ticker is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticker {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Ticker {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================================
// Price
// =============================================================================

/// A non-negative, finite price.
///
/// Whole values within the exactly representable integer range serialize as
/// JSON integers (`20000`), everything else as a float (`27123.45`).
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Price(f64);

/// Largest integer an `f64` holds exactly (2^53).
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Price {
    /// The zero price, reported by the logging decorator for failed calls.
    pub const ZERO: Self = Self(0.0);

    /// Create a price, rejecting negative and non-finite values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then_some(Self(value))
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract() == 0.0 && self.0 <= MAX_EXACT_INTEGER {
            serializer.serialize_u64(self.0 as u64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Price Quote
// =============================================================================

/// Result of a successful lookup: the requested ticker and its price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    /// Ticker as requested by the caller.
    pub ticker: Ticker,
    /// Resolved price.
    pub price: Price,
}

impl PriceQuote {
    /// Create a new quote.
    #[must_use]
    pub const fn new(ticker: Ticker, price: Price) -> Self {
        Self { ticker, price }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors produced while fetching a price.
///
/// Messages are user-visible on both transports, so they carry no source
/// chains or internal detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// The source does not know the ticker.
    #[error("the given ticker ({0}) is not supported")]
    UnsupportedTicker(Ticker),

    /// The upstream provider could not be reached or answered badly.
    #[error("{0}")]
    UpstreamFailure(String),

    /// The upstream answer lacked a usable quote in the expected currency.
    #[error("USD price not available for ticker: {0}")]
    MalformedUpstreamPayload(Ticker),

    /// The inbound request was cancelled before the fetch completed.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline elapsed.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// The fetch task failed outside the price source.
    #[error("{0}")]
    Internal(String),
}

impl PriceError {
    /// Short machine-readable kind, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedTicker(_) => "unsupported_ticker",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::MalformedUpstreamPayload(_) => "malformed_upstream_payload",
            Self::Cancelled => "cancelled",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
