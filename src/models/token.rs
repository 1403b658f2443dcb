//! Token-related domain models
//!
//! This module defines the signed token claims, the issued token returned by
//! the login flow, and the login request/response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value of `token_type` in login responses
pub const TOKEN_TYPE: &str = "bearer";

/// Claims embedded in a signed bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,

    /// Issued-at, Unix seconds
    pub iat: i64,

    /// Expiry, Unix seconds
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject` issued at `now`, valid for `ttl_secs`
    ///
    /// `exp` saturates at `i64::MAX` instead of overflowing.
    pub fn new(subject: impl Into<String>, now: DateTime<Utc>, ttl_secs: i64) -> Self {
        let iat = now.timestamp();
        Self {
            sub: subject.into(),
            iat,
            exp: iat.saturating_add(ttl_secs),
        }
    }

    /// Whether the token is still valid at `now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() < self.exp
    }
}

/// A freshly signed token and its claims
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token
    pub token: String,

    /// Claims the token carries
    pub claims: Claims,
}

/// Login request body (`POST /token`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Login response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.token,
            token_type: TOKEN_TYPE.to_string(),
        }
    }
}
