//! Infrastructure adapters for external systems.

pub mod http;
pub mod media;
pub mod rest;
pub mod sqlite;
