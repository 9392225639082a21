//! JSON HTTP API
//!
//! Axum adapter mapping `GET /?ticker=<TICKER>` onto the shared decorated
//! price service.
//!
//! # Endpoints
//!
//! - `GET /?ticker=X` - `{"ticker","price"}` (200) or `{"error"}` (400)
//! - `GET /healthz` - liveness probe (simple OK)
//! - `GET /metrics` - Prometheus metrics in text format
//!
//! Every price response carries the request's correlation id in the
//! `x-request-id` header.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::application::services::FetchDispatcher;
use crate::domain::context::{CorrelationId, Transport};
use crate::domain::pricing::{PriceError, Ticker};
use crate::infrastructure::listener::{self, ServerError};
use crate::infrastructure::metrics::get_metrics_handle;

/// Response header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// Request / Response Types
// =============================================================================

/// Raw query pairs; duplicates are accepted and the first `ticker` wins.
type QueryPairs = Vec<(String, String)>;

fn first_ticker(pairs: QueryPairs) -> Ticker {
    pairs
        .into_iter()
        .find_map(|(key, value)| (key == "ticker").then_some(value))
        .map(Ticker::new)
        .unwrap_or_default()
}

/// Body of a failed price request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message.
    pub error: String,
}

/// A failed lookup, rendered as 400 with the error message only.
#[derive(Debug)]
pub struct ApiError {
    correlation_id: CorrelationId,
    error: PriceError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            [(REQUEST_ID_HEADER, self.correlation_id.to_string())],
            Json(ErrorBody {
                error: self.error.to_string(),
            }),
        )
            .into_response()
    }
}

// =============================================================================
// HTTP Server
// =============================================================================

/// JSON API server.
pub struct HttpServer {
    addr: SocketAddr,
    dispatcher: FetchDispatcher,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server.
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
    /// Returns `ServerError` if binding fails or the server stops with a
    /// fatal error.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = listener::bind(self.addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` if the server stops with a fatal
    /// error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let addr = listener.local_addr().unwrap_or(self.addr);
        let app = create_router(self.dispatcher);

        tracing::info!(%addr, "HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the JSON API router.
pub fn create_router(dispatcher: FetchDispatcher) -> Router {
    Router::new()
        .route("/", get(price_handler))
        .route("/healthz", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(dispatcher)
}

// =============================================================================
// HTTP Handlers
// =============================================================================

async fn price_handler(
    State(dispatcher): State<FetchDispatcher>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, ApiError> {
    let dispatched = dispatcher
        .dispatch(Transport::Http, first_ticker(pairs))
        .await;

    match dispatched.result {
        Ok(quote) => Ok((
            StatusCode::OK,
            [(REQUEST_ID_HEADER, dispatched.correlation_id.to_string())],
            Json(quote),
        )
            .into_response()),
        Err(error) => Err(ApiError {
            correlation_id: dispatched.correlation_id,
            error,
        }),
    }
}

async fn liveness_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn metrics_handler() -> impl IntoResponse {
    get_metrics_handle().map_or_else(
        || {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("content-type", "text/plain")],
                "Metrics not initialized".to_string(),
            )
        },
        |handle| {
            (
                StatusCode::OK,
                [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
                handle.render(),
            )
        },
    )
}

// =============================================================================
// Tests
// =============================================================================
