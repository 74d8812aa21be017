//! Configuration management for Agora.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
