//! `FetchLogger` that writes one structured `tracing` event per fetch.

use crate::application::ports::{FetchLogger, FetchRecord};

/// Emits a `fetch_price` event: `info` on success, `warn` on failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFetchLogger;

impl FetchLogger for TracingFetchLogger {
    fn log_fetch(&self, record: &FetchRecord) {
        let took_ms = u64::try_from(record.elapsed.as_millis()).unwrap_or(u64::MAX);

        match &record.error {
            None => tracing::info!(
                request_id = %record.correlation_id,
                transport = %record.transport,
                ticker = %record.ticker,
                price = record.price.value(),
                took_ms,
                "fetch_price"
            ),
            Some(error) => tracing::warn!(
                request_id = %record.correlation_id,
                transport = %record.transport,
                ticker = %record.ticker,
                price = record.price.value(),
                took_ms,
                error = %error,
                error_kind = error.kind(),
                "fetch_price"
            ),
        }
    }
}
