//! Price Service Configuration Settings
//!
//! Configuration types for the price service, loaded from environment
//! variables.

use std::net::SocketAddr;
use std::time::Duration;

use crate::application::services::DEFAULT_REQUEST_TIMEOUT;
use crate::domain::pricing::Ticker;
use crate::infrastructure::price_source::COINMARKETCAP_BASE_URL;

/// Base price source selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// In-memory fixed price table.
    #[default]
    Static,
    /// CoinMarketCap quotes API.
    CoinMarketCap,
}

impl SourceKind {
    /// Parse a source name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownSource` for any other name.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "coinmarketcap" | "cmc" => Ok(Self::CoinMarketCap),
            _ => Err(ConfigError::UnknownSource(s.to_string())),
        }
    }

    /// Get the source name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::CoinMarketCap => "coinmarketcap",
        }
    }
}

/// Upstream API key.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// Get the raw key for request headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Listener addresses.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// JSON HTTP API address.
    pub http_addr: SocketAddr,
    /// gRPC address.
    pub grpc_addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            grpc_addr: SocketAddr::from(([0, 0, 0, 0], 4000)),
        }
    }
}

/// CoinMarketCap client settings.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    /// API key, required for the CoinMarketCap source.
    pub api_key: Option<ApiKey>,
    /// Base URL of the quotes API.
    pub base_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: COINMARKETCAP_BASE_URL.to_string(),
            timeout: Duration::from_millis(5000),
        }
    }
}

/// Demo poller settings.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Time between polls (zero = disabled).
    pub interval: Duration,
    /// Ticker to request.
    pub ticker: Ticker,
}

impl PollerSettings {
    /// Whether the poller should run.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::ZERO,
            ticker: Ticker::new("BTC"),
        }
    }
}

/// Complete price service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listener addresses.
    pub server: ServerSettings,
    /// Selected base source.
    pub source: SourceKind,
    /// Upstream client settings.
    pub upstream: UpstreamSettings,
    /// Per-request deadline enforced by the dispatcher.
    pub request_timeout: Duration,
    /// Demo poller settings.
    pub poller: PollerSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            source: SourceKind::default(),
            upstream: UpstreamSettings::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            poller: PollerSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value or the selected
    /// source is missing its credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);
        let defaults = Self::default();

        let server = ServerSettings {
            http_addr: env.parse("PRICE_HTTP_ADDR", defaults.server.http_addr)?,
            grpc_addr: env.parse("PRICE_GRPC_ADDR", defaults.server.grpc_addr)?,
        };

        let api_key = env.get("CMC_API_KEY").map(ApiKey::new);

        let source = match env.get("PRICE_SOURCE") {
            Some(name) => SourceKind::parse(&name)?,
            None if api_key.is_some() => SourceKind::CoinMarketCap,
            None => SourceKind::Static,
        };

        if source == SourceKind::CoinMarketCap && api_key.is_none() {
            return Err(match lookup("CMC_API_KEY") {
                Some(_) => ConfigError::EmptyValue("CMC_API_KEY".to_string()),
                None => ConfigError::MissingEnvVar("CMC_API_KEY".to_string()),
            });
        }

        let upstream = UpstreamSettings {
            api_key,
            base_url: env
                .get("CMC_BASE_URL")
                .unwrap_or(defaults.upstream.base_url),
            timeout: env.millis("CMC_TIMEOUT_MS", defaults.upstream.timeout)?,
        };

        let request_timeout = env.millis("PRICE_REQUEST_TIMEOUT_MS", defaults.request_timeout)?;
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "PRICE_REQUEST_TIMEOUT_MS".to_string(),
                value: "0".to_string(),
            });
        }

        let poller = PollerSettings {
            interval: env.secs("PRICE_POLL_INTERVAL_SECS", defaults.poller.interval)?,
            ticker: env
                .get("PRICE_POLL_TICKER")
                .map_or(defaults.poller.ticker, Ticker::new),
        };

        Ok(Self {
            server,
            source,
            upstream,
            request_timeout,
            poller,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable could not be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Raw value.
        value: String,
    },
    /// `PRICE_SOURCE` names no known source.
    #[error("unknown price source: {0:?} (expected \"static\" or \"coinmarketcap\")")]
    UnknownSource(String),
}

/// Typed view over a variable lookup. Unset and blank values fall back to
/// defaults; set values must parse.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        self.get(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value,
                })
        })
    }

    fn millis(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.get(key)
            .map_or(Ok(default), |_| self.parse(key, 0_u64).map(Duration::from_millis))
    }

    fn secs(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        self.get(key)
            .map_or(Ok(default), |_| self.parse(key, 0_u64).map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_any_variables() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.server.grpc_addr.port(), 4000);
        assert_eq!(config.source, SourceKind::Static);
        assert!(config.upstream.api_key.is_none());
        assert_eq!(config.upstream.base_url, "https://pro-api.coinmarketcap.com");
        assert_eq!(config.upstream.timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.poller.is_enabled());
        assert_eq!(config.poller.ticker.as_str(), "BTC");
    }

    #[test]
    fn api_key_selects_coinmarketcap() {
        let config = load(&[("CMC_API_KEY", "abc")]).unwrap();
        assert_eq!(config.source, SourceKind::CoinMarketCap);
        assert_eq!(config.upstream.api_key.unwrap().expose(), "abc");
    }

    #[test]
    fn explicit_static_wins_over_api_key() {
        let config = load(&[("CMC_API_KEY", "abc"), ("PRICE_SOURCE", "Static")]).unwrap();
        assert_eq!(config.source, SourceKind::Static);
    }

    #[test]
    fn coinmarketcap_requires_api_key() {
        let err = load(&[("PRICE_SOURCE", "coinmarketcap")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "CMC_API_KEY"));
    }

    #[test]
    fn coinmarketcap_rejects_blank_api_key() {
        let err = load(&[("PRICE_SOURCE", "coinmarketcap"), ("CMC_API_KEY", " ")]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue(key) if key == "CMC_API_KEY"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = load(&[("PRICE_SOURCE", "binance")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSource(name) if name == "binance"));
    }

    #[test]
    fn invalid_address_is_rejected() {
        let err = load(&[("PRICE_HTTP_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, .. } if key == "PRICE_HTTP_ADDR"
        ));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = load(&[("CMC_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, value } if key == "CMC_TIMEOUT_MS" && value == "soon"
        ));
    }

    #[test]
    fn zero_request_timeout_is_rejected() {
        assert!(load(&[("PRICE_REQUEST_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("PRICE_HTTP_ADDR", "127.0.0.1:8080"),
            ("PRICE_GRPC_ADDR", "127.0.0.1:9090"),
            ("CMC_BASE_URL", "http://localhost:1234"),
            ("CMC_TIMEOUT_MS", "750"),
            ("PRICE_REQUEST_TIMEOUT_MS", "2500"),
            ("PRICE_POLL_INTERVAL_SECS", "5"),
            ("PRICE_POLL_TICKER", "ETH"),
        ])
        .unwrap();

        assert_eq!(config.server.http_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.server.grpc_addr.to_string(), "127.0.0.1:9090");
        assert_eq!(config.upstream.base_url, "http://localhost:1234");
        assert_eq!(config.upstream.timeout, Duration::from_millis(750));
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert!(config.poller.is_enabled());
        assert_eq!(config.poller.interval, Duration::from_secs(5));
        assert_eq!(config.poller.ticker.as_str(), "ETH");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("PRICE_HTTP_ADDR", "  "), ("CMC_API_KEY", "")]).unwrap();
        assert_eq!(config.server.http_addr.port(), 3000);
        assert_eq!(config.source, SourceKind::Static);
    }

    #[test]
    fn source_kind_names() {
        assert_eq!(SourceKind::parse("CMC").unwrap(), SourceKind::CoinMarketCap);
        assert_eq!(SourceKind::CoinMarketCap.as_str(), "coinmarketcap");
        assert_eq!(SourceKind::Static.as_str(), "static");
    }

    #[test]
    fn api_key_redacted_debug() {
        let key = ApiKey::new("secret-key-123".to_string());
        let debug = format!("{key:?}");
        assert!(!debug.contains("secret-key-123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
