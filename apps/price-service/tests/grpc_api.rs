//! gRPC API Integration Tests
//!
//! Runs `GrpcServer` on an ephemeral port and talks to it with the generated
//! client.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use price_service::{
    DEFAULT_REQUEST_TIMEOUT, GrpcServer, PricePoller, REQUEST_ID_METADATA, ServerError, Ticker,
    Transport,
    proto::{PriceRequest, price_fetcher_client::PriceFetcherClient},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic::{Code, Request};
use uuid::Uuid;

use common::Harness;

struct TestServer {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    async fn start(harness: &Harness) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();

        let server = GrpcServer::new(
            addr,
            harness.dispatcher(DEFAULT_REQUEST_TIMEOUT),
            cancel.clone(),
        );
        let handle = tokio::spawn(server.serve(listener));

        Self {
            addr,
            cancel,
            handle,
        }
    }

    async fn client(&self) -> PriceFetcherClient<Channel> {
        PriceFetcherClient::connect(format!("http://{}", self.addr))
            .await
            .unwrap()
    }

    async fn stop(self) {
        self.cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}

fn request_id(metadata: &tonic::metadata::MetadataMap) -> Option<Uuid> {
    metadata
        .get(REQUEST_ID_METADATA)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
}

#[tokio::test]
async fn known_ticker_is_echoed_with_price() {
    let harness = Harness::with_static_source();
    let server = TestServer::start(&harness).await;
    let mut client = server.client().await;

    let response = client
        .fetch_price(Request::new(PriceRequest {
            ticker: "ETH".to_string(),
        }))
        .await
        .unwrap();

    let id = request_id(response.metadata());
    let body = response.into_inner();
    assert_eq!(body.ticker, "ETH");
    assert_eq!(body.price, 200.0);

    let records = harness.logger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transport, Transport::Grpc);
    assert_eq!(id, Some(*records[0].correlation_id.as_uuid()));

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn unknown_ticker_is_not_found() {
    let harness = Harness::with_static_source();
    let server = TestServer::start(&harness).await;
    let mut client = server.client().await;

    let status = client
        .fetch_price(Request::new(PriceRequest {
            ticker: "DOGE".to_string(),
        }))
        .await
        .unwrap_err();

    assert_eq!(status.code(), Code::NotFound);
    assert_eq!(status.message(), "the given ticker (DOGE) is not supported");

    let records = harness.logger.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        request_id(status.metadata()),
        Some(*records[0].correlation_id.as_uuid())
    );

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn both_transports_share_one_chain() {
    let harness = Harness::with_static_source();
    let server = TestServer::start(&harness).await;
    let mut client = server.client().await;

    client
        .fetch_price(Request::new(PriceRequest {
            ticker: "BTC".to_string(),
        }))
        .await
        .unwrap();
    harness
        .dispatcher(DEFAULT_REQUEST_TIMEOUT)
        .dispatch(Transport::Http, Ticker::new("BTC"))
        .await;

    let transports: Vec<_> = harness.sink.events().into_iter().map(|(t, _)| t).collect();
    assert_eq!(transports, vec![Transport::Grpc, Transport::Http]);

    drop(client);
    server.stop().await;
}

#[tokio::test]
async fn poller_reaches_the_server() {
    let harness = Harness::with_static_source();
    let server = TestServer::start(&harness).await;

    let mut poller = PricePoller::new(
        server.addr,
        Ticker::new("BTC"),
        Duration::from_secs(60),
        CancellationToken::new(),
    )
    .unwrap();

    let response = poller.poll_once().await.unwrap().into_inner();
    assert_eq!(response.ticker, "BTC");
    assert_eq!(response.price, 20_000.0);

    drop(poller);
    server.stop().await;
}

#[tokio::test]
async fn poller_run_stops_on_cancel() {
    let harness = Harness::with_static_source();
    let server = TestServer::start(&harness).await;
    let cancel = CancellationToken::new();

    let poller = PricePoller::new(
        server.addr,
        Ticker::new("ETH"),
        Duration::from_millis(20),
        cancel.clone(),
    )
    .unwrap();
    let handle = tokio::spawn(poller.run());

    harness.logger.wait_for(2).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    server.stop().await;
}
