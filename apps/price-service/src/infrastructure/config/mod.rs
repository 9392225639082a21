//! Configuration Module
//!
//! Environment-driven configuration for the price service.

mod settings;

pub use settings::{
    ApiKey, ConfigError, PollerSettings, ServerSettings, ServiceConfig, SourceKind,
    UpstreamSettings,
};
