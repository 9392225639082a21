//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use price_service::{
    FetchDispatcher, FetchLogger, FetchRecord, MetricsSink, RequestContext, SharedPriceService,
    StaticPriceSource, Ticker, Transport, standard_chain,
};

/// Logger that keeps every record in memory.
#[derive(Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<FetchRecord>>,
}

impl RecordingLogger {
    pub fn records(&self) -> Vec<FetchRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Wait until at least `count` records have arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<FetchRecord> {
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let records = self.records();
                if records.len() >= count {
                    return records;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap()
    }
}

impl FetchLogger for RecordingLogger {
    fn log_fetch(&self, record: &FetchRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Metrics sink that keeps every invocation in memory.
#[derive(Default)]
pub struct CountingSink {
    events: Mutex<Vec<(Transport, Ticker)>>,
}

impl CountingSink {
    pub fn events(&self) -> Vec<(Transport, Ticker)> {
        self.events.lock().unwrap().clone()
    }
}

impl MetricsSink for CountingSink {
    fn record_invocation(&self, ctx: &RequestContext, ticker: &Ticker) {
        self.events
            .lock()
            .unwrap()
            .push((ctx.transport(), ticker.clone()));
    }
}

/// Standard chain over `source` with in-memory collaborators.
pub struct Harness {
    pub service: SharedPriceService,
    pub logger: Arc<RecordingLogger>,
    pub sink: Arc<CountingSink>,
}

impl Harness {
    pub fn new(source: SharedPriceService) -> Self {
        let logger = Arc::new(RecordingLogger::default());
        let sink = Arc::new(CountingSink::default());
        let service = standard_chain(source, logger.clone(), sink.clone());
        Self {
            service,
            logger,
            sink,
        }
    }

    pub fn with_static_source() -> Self {
        Self::new(Arc::new(StaticPriceSource::default()))
    }

    pub fn dispatcher(&self, timeout: Duration) -> FetchDispatcher {
        FetchDispatcher::new(self.service.clone(), timeout)
    }
}
