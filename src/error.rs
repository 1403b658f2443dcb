//! Application error types for aihub-auth
//!
//! This module defines common error types used throughout the application.
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::config::ConfigError;
use crate::server::ServerError;

/// Authentication-related errors
///
/// These describe *why* a credential was refused. They are logged and used
/// in tests, but never returned to the client: every strategy maps all of
/// them onto one fixed status code and message.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    /// No credential material was supplied
    #[error("Missing credential")]
    MissingCredential,

    /// Credential material was present but could not be parsed
    #[error("Malformed credential")]
    MalformedCredential,

    /// Wrong password, unknown user, wrong key or bad token signature
    #[error("Invalid credential")]
    InvalidCredential,

    /// Signed token past its expiry
    #[error("Token expired")]
    ExpiredToken,

    /// Verification could not be completed (hash worker failure, timeout)
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

/// Password hashing errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HashError {
    /// Hash parameters rejected by argon2
    #[error("Invalid hash parameters: {0}")]
    InvalidParams(String),

    /// Hashing failed
    #[error("Hash failed: {0}")]
    HashFailed(String),
}

/// Application-level error type
///
/// Aggregates the domain-specific error types for startup and wiring code.
#[derive(Debug, Error)]
pub enum AppError {
    /// Hashing error
    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server error
    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}
