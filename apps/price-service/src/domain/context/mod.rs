//! Request Context
//!
//! Per-call metadata created at the transport boundary and passed by
//! reference through the whole price service chain.
//!
//! A context is immutable once built: it exposes accessors only. The
//! cancellation token inside is the one piece of shared signalling; it is
//! owned by whoever created the context and observed by the price sources.

use std::fmt;

use serde::Serialize;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

// =============================================================================
// Correlation ID
// =============================================================================

/// Identifier tying together every record produced for one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Front-end that received the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// JSON over HTTP.
    Http,
    /// gRPC.
    Grpc,
}

impl Transport {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Grpc => "grpc",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Request Context
// =============================================================================

/// Immutable per-request context.
#[derive(Debug, Clone)]
pub struct RequestContext {
    correlation_id: CorrelationId,
    transport: Transport,
    cancel: CancellationToken,
}

impl RequestContext {
    /// Create a context with a freshly generated correlation id.
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self::with_correlation_id(CorrelationId::generate(), transport, CancellationToken::new())
    }

    /// Create a context from explicit parts.
    #[must_use]
    pub const fn with_correlation_id(
        correlation_id: CorrelationId,
        transport: Transport,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            correlation_id,
            transport,
            cancel,
        }
    }

    /// Correlation id for this request.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Transport that received this request.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        self.transport
    }

    /// Token cancelled when the inbound request goes away.
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Whether the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the request is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = RequestContext::new(Transport::Http);
        let b = RequestContext::new(Transport::Http);
        assert_ne!(a.correlation_id(), b.correlation_id());
    }

    #[test]
    fn transport_labels() {
        assert_eq!(Transport::Http.as_str(), "http");
        assert_eq!(Transport::Grpc.as_str(), "grpc");
        assert_eq!(
            serde_json::to_string(&Transport::Grpc).unwrap(),
            "\"grpc\""
        );
    }

    #[test]
    fn cancellation_is_visible_through_clones() {
        let token = CancellationToken::new();
        let ctx =
            RequestContext::with_correlation_id(CorrelationId::generate(), Transport::Grpc, token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn correlation_id_displays_as_uuid() {
        let uuid = Uuid::new_v4();
        let id = CorrelationId::from_uuid(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.as_uuid(), &uuid);
    }
}
