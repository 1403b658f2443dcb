//! Per-endpoint authentication strategies and their outcomes
//!
//! Every endpoint is guarded by exactly one [`AuthStrategy`]. Verifying a
//! request under a strategy yields an [`AuthOutcome`]: either an
//! authenticated identity or a [`Rejection`]. A rejection keeps the precise
//! internal reason for logs and tests, but its public status code and message
//! depend only on the strategy, so clients cannot tell which check failed.

use axum::http::StatusCode;

use crate::error::AuthError;

/// Verification policy attached to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStrategy {
    /// No authentication
    None,
    /// Static API key in the `x-api-key` header
    ApiKey,
    /// HTTP Basic credentials checked against the credential store
    Basic,
    /// Username and password in a request body, exchanged for a token
    Login,
    /// Bearer token, reported as OAuth2
    OAuth2,
    /// Bearer token
    Bearer,
}

impl AuthStrategy {
    /// Label used in response payloads and metrics
    pub fn label(&self) -> &'static str {
        match self {
            AuthStrategy::None => "none",
            AuthStrategy::ApiKey => "api_key",
            AuthStrategy::Basic => "basic",
            AuthStrategy::Login => "login",
            AuthStrategy::OAuth2 => "oauth2",
            AuthStrategy::Bearer => "bearer",
        }
    }

    /// Status code returned for every rejection under this strategy
    pub fn rejection_status(&self) -> StatusCode {
        match self {
            AuthStrategy::Basic | AuthStrategy::Login => StatusCode::UNAUTHORIZED,
            AuthStrategy::None
            | AuthStrategy::ApiKey
            | AuthStrategy::OAuth2
            | AuthStrategy::Bearer => StatusCode::FORBIDDEN,
        }
    }

    /// Message returned for every rejection under this strategy
    pub fn rejection_detail(&self) -> &'static str {
        match self {
            AuthStrategy::None => "Forbidden",
            AuthStrategy::ApiKey => "Invalid API Key",
            AuthStrategy::Basic => "Invalid Basic Auth credentials",
            AuthStrategy::Login => "Invalid username or password",
            AuthStrategy::OAuth2 => "Invalid OAuth2 token",
            AuthStrategy::Bearer => "Invalid Bearer token",
        }
    }
}

/// Which check actually accepted the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    /// Unauthenticated endpoint
    None,
    /// Matching API key
    ApiKey,
    /// Username and password
    Password,
    /// Allowlisted static token; signature and expiry were not checked
    StaticToken,
    /// Signed token verified by the token signer
    SignedToken,
}

impl AuthMethod {
    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::ApiKey => "api_key",
            AuthMethod::Password => "password",
            AuthMethod::StaticToken => "static_token",
            AuthMethod::SignedToken => "signed_token",
        }
    }
}

/// Who the caller is once accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Access granted without a user (public endpoint, API key)
    Anonymous,
    /// A named user
    User(String),
}

impl Identity {
    /// Username, if the identity is a user
    pub fn username(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(name) => Some(name),
        }
    }
}

/// A refused request
///
/// `reason` is for logs and tests only; the response is built from the
/// strategy alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    strategy: AuthStrategy,
    reason: AuthError,
}

impl Rejection {
    pub fn new(strategy: AuthStrategy, reason: AuthError) -> Self {
        Self { strategy, reason }
    }

    pub fn strategy(&self) -> AuthStrategy {
        self.strategy
    }

    /// Internal reason; never sent to the client
    pub fn reason(&self) -> &AuthError {
        &self.reason
    }

    pub fn status(&self) -> StatusCode {
        self.strategy.rejection_status()
    }

    pub fn detail(&self) -> &'static str {
        self.strategy.rejection_detail()
    }
}

/// Result of verifying one request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authenticated {
        identity: Identity,
        method: AuthMethod,
    },
    Rejected(Rejection),
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }

    /// Label for metrics: `accepted` or `rejected`
    pub fn label(&self) -> &'static str {
        match self {
            AuthOutcome::Authenticated { .. } => "accepted",
            AuthOutcome::Rejected(_) => "rejected",
        }
    }

    /// Split into identity and method, or the rejection
    pub fn into_result(self) -> Result<(Identity, AuthMethod), Rejection> {
        match self {
            AuthOutcome::Authenticated { identity, method } => Ok((identity, method)),
            AuthOutcome::Rejected(rejection) => Err(rejection),
        }
    }
}
