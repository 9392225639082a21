//! Listener binding and server errors shared by both transports.

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// Transport server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listen address.
    #[error("failed to bind to {addr}: {reason}")]
    BindFailed {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        reason: String,
    },

    /// The server stopped with a fatal error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

/// Bind a TCP listener on `addr`.
///
/// # Errors
///
/// Returns `ServerError::BindFailed` if the address is unavailable.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::BindFailed {
            addr,
            reason: e.to_string(),
        })
}
