//! Prometheus Metrics Module
//!
//! Exposes price service metrics in Prometheus format.
//!
//! # Metrics
//!
//! - `price_service_fetch_requests_total{transport}`: one increment per call
//!   entering the decorated service
//!
//! # Integration
//!
//! The registry is rendered at `/metrics` on the JSON API listener.

use std::sync::OnceLock;

use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

use crate::application::ports::MetricsSink;
use crate::domain::context::{RequestContext, Transport};
use crate::domain::pricing::Ticker;

const FETCH_REQUESTS_TOTAL: &str = "price_service_fetch_requests_total";

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and describe all metrics.
///
/// Idempotent: later calls return the handle from the first successful call.
///
/// # Errors
///
/// Returns `BuildError` if another global recorder is already installed.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    register_metrics();

    Ok(PROMETHEUS_HANDLE.get_or_init(|| handle).clone())
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

fn register_metrics() {
    describe_counter!(
        FETCH_REQUESTS_TOTAL,
        "Total price fetches entering the service chain, by transport"
    );
}

// =============================================================================
// Metric Recording
// =============================================================================

/// Record one fetch invocation.
pub fn record_fetch_invocation(transport: Transport) {
    counter!(FETCH_REQUESTS_TOTAL, "transport" => transport.as_str()).increment(1);
}

/// `MetricsSink` backed by the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetricsSink;

impl MetricsSink for PrometheusMetricsSink {
    fn record_invocation(&self, ctx: &RequestContext, _ticker: &Ticker) {
        record_fetch_invocation(ctx.transport());
    }
}

// =============================================================================
// Tests
// =============================================================================
