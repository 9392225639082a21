//! Demo gRPC Poller
//!
//! Background client that asks the service's own gRPC listener for one
//! ticker on a fixed interval and logs each answer. Useful as a smoke test of
//! the RPC path in a running deployment.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Channel, Endpoint};

use super::proto::price::v1::{PriceRequest, PriceResponse, price_fetcher_client::PriceFetcherClient};
use super::server::REQUEST_ID_METADATA;
use crate::domain::pricing::Ticker;

/// Periodic `FetchPrice` caller.
pub struct PricePoller {
    client: PriceFetcherClient<Channel>,
    ticker: Ticker,
    interval: Duration,
    cancel: CancellationToken,
}

impl PricePoller {
    /// Create a poller targeting the gRPC listener at `addr`.
    ///
    /// The channel connects lazily, so the listener need not be up yet.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` does not form a valid endpoint URI.
    pub fn new(
        addr: SocketAddr,
        ticker: Ticker,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint_uri(addr))?.connect_lazy();

        Ok(Self {
            client: PriceFetcherClient::new(channel),
            ticker,
            interval,
            cancel,
        })
    }

    /// Issue a single `FetchPrice` call.
    ///
    /// # Errors
    ///
    /// Returns the server's status on failure.
    pub async fn poll_once(&mut self) -> Result<tonic::Response<PriceResponse>, tonic::Status> {
        self.client
            .fetch_price(PriceRequest {
                ticker: self.ticker.as_str().to_string(),
            })
            .await
    }

    /// Poll until cancelled.
    pub async fn run(mut self) {
        let cancel = self.cancel.clone();
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            ticker = %self.ticker,
            interval_secs = self.interval.as_secs(),
            "Price poller started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            let outcome = tokio::select! {
                () = cancel.cancelled() => break,
                outcome = self.poll_once() => outcome,
            };

            match outcome {
                Ok(response) => {
                    let request_id = response
                        .metadata()
                        .get(REQUEST_ID_METADATA)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    let body = response.into_inner();
                    tracing::info!(
                        request_id = %request_id,
                        ticker = %body.ticker,
                        price = body.price,
                        "Polled price"
                    );
                }
                Err(status) => {
                    tracing::warn!(
                        ticker = %self.ticker,
                        code = ?status.code(),
                        error = %status.message(),
                        "Price poll failed"
                    );
                }
            }
        }

        tracing::info!("Price poller stopped");
    }
}

/// Client URI for a listen address; unspecified hosts dial loopback.
fn endpoint_uri(addr: SocketAddr) -> String {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}
