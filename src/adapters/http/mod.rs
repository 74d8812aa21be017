//! HTTP API for the engagement engine.

pub mod api;

pub use api::{ApiServer, HttpServerConfig};
