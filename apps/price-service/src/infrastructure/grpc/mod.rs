//! gRPC Transport
//!
//! Serves `price.v1.PriceFetcher` and provides the demo client poller.
//!
//! The protobuf stubs under `generated/` are produced from
//! `proto/price/v1/price.proto` and checked in.

pub mod poller;
pub mod server;

// Allow clippy warnings and missing docs in generated code
#[allow(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
pub mod proto {
    pub mod price {
        pub mod v1 {
            include!("generated/price.v1.rs");
        }
    }
}

pub use poller::PricePoller;
pub use server::{GrpcServer, PriceGrpcService, REQUEST_ID_METADATA, status_code};
