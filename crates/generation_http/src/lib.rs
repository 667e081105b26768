//! HTTP/JSON transport for the `generation_service` contract.
//!
//! The remote service exposes two JSON flows: one that opens a session and one
//! that continues it. This crate owns endpoint construction, retry policy,
//! error-body parsing and config-file loading. It contains no session logic.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod service;
pub mod url;

pub use client::FlowClient;
pub use config::{ConfigError, HttpServiceConfig};
pub use error::parse_error_message;
pub use service::{HttpService, HTTP_SERVICE_ID};
pub use url::join_endpoint;
