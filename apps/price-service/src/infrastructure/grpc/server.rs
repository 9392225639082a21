//! gRPC Price Server
//!
//! Implements `price.v1.PriceFetcher` on top of the shared fetch dispatcher,
//! and owns the tonic server lifecycle.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::metadata::{Ascii, MetadataMap, MetadataValue};
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};

use super::proto::price::v1::{
    PriceRequest, PriceResponse,
    price_fetcher_server::{PriceFetcher, PriceFetcherServer},
};
use crate::application::services::FetchDispatcher;
use crate::domain::context::{CorrelationId, Transport};
use crate::domain::pricing::{PriceError, Ticker};
use crate::infrastructure::listener::{self, ServerError};

/// Metadata key carrying the correlation id.
pub const REQUEST_ID_METADATA: &str = "x-request-id";

// =============================================================================
// Service
// =============================================================================

/// `PriceFetcher` implementation backed by a `FetchDispatcher`.
#[derive(Clone)]
pub struct PriceGrpcService {
    dispatcher: FetchDispatcher,
}

impl PriceGrpcService {
    /// Create a new service.
    #[must_use]
    pub const fn new(dispatcher: FetchDispatcher) -> Self {
        Self { dispatcher }
    }
}

#[tonic::async_trait]
impl PriceFetcher for PriceGrpcService {
    async fn fetch_price(
        &self,
        request: Request<PriceRequest>,
    ) -> Result<Response<PriceResponse>, Status> {
        let ticker = Ticker::new(request.into_inner().ticker);
        let dispatched = self.dispatcher.dispatch(Transport::Grpc, ticker).await;

        match dispatched.result {
            Ok(quote) => {
                let mut response = Response::new(PriceResponse {
                    ticker: quote.ticker.into_inner(),
                    price: quote.price.value(),
                });
                attach_request_id(response.metadata_mut(), dispatched.correlation_id);
                Ok(response)
            }
            Err(error) => {
                let mut status = Status::new(status_code(&error), error.to_string());
                attach_request_id(status.metadata_mut(), dispatched.correlation_id);
                Err(status)
            }
        }
    }
}

/// gRPC status code for a price error.
#[must_use]
pub const fn status_code(error: &PriceError) -> Code {
    match error {
        PriceError::UnsupportedTicker(_) => Code::NotFound,
        PriceError::UpstreamFailure(_) => Code::Unavailable,
        PriceError::MalformedUpstreamPayload(_) | PriceError::Internal(_) => Code::Internal,
        PriceError::Cancelled => Code::Cancelled,
        PriceError::Timeout(_) => Code::DeadlineExceeded,
    }
}

fn attach_request_id(metadata: &mut MetadataMap, id: CorrelationId) {
    if let Ok(value) = id.to_string().parse::<MetadataValue<Ascii>>() {
        metadata.insert(REQUEST_ID_METADATA, value);
    }
}

// =============================================================================
// Server
// =============================================================================

/// gRPC server for the price service.
pub struct GrpcServer {
    addr: SocketAddr,
    dispatcher: FetchDispatcher,
    cancel: CancellationToken,
}

impl GrpcServer {
    /// Create a new gRPC server.
    #[must_use]
    pub const fn new(addr: SocketAddr, dispatcher: FetchDispatcher, cancel: CancellationToken) -> Self {
        Self {
            addr,
            dispatcher,
            cancel,
        }
    }

    /// Bind the configured address and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if binding fails or the transport stops with a
    /// fatal error.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = listener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` if the transport stops with a
    /// fatal error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr().unwrap_or(self.addr);
        let service = PriceFetcherServer::new(PriceGrpcService::new(self.dispatcher));

        tracing::info!(%addr, "gRPC server listening");

        Server::builder()
            .add_service(service)
            .serve_with_incoming_shutdown(
                TcpListenerStream::new(listener),
                self.cancel.cancelled_owned(),
            )
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
