//! aihub-auth - demonstration service for common HTTP authentication schemes
//!
//! Serves one AI Hub metadata payload behind several guards: no auth, an API
//! key header, HTTP Basic, and bearer tokens issued by a login endpoint.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod otel;
pub mod server;
