//! HTTP middleware for aihub-auth
//!
//! This module provides middleware for:
//! - Per-route authentication guards
//! - Request/response logging
//! - OpenTelemetry tracing

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use std::time::Instant;

use crate::auth::{AuthManager, AuthMethod, AuthStrategy, Identity, Rejection, UserStore};

/// State of one route's authentication guard
///
/// Each protected route gets its own guard carrying the strategy it enforces.
pub struct AuthGuard<S: UserStore> {
    auth_manager: Arc<AuthManager<S>>,
    strategy: AuthStrategy,
}

impl<S: UserStore> AuthGuard<S> {
    /// Create a guard enforcing `strategy`
    pub fn new(auth_manager: Arc<AuthManager<S>>, strategy: AuthStrategy) -> Self {
        Self {
            auth_manager,
            strategy,
        }
    }
}

impl<S: UserStore> Clone for AuthGuard<S> {
    fn clone(&self) -> Self {
        Self {
            auth_manager: Arc::clone(&self.auth_manager),
            strategy: self.strategy,
        }
    }
}

/// Authenticated caller, inserted into request extensions by the guard
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedClient {
    pub strategy: AuthStrategy,
    pub identity: Identity,
    pub method: AuthMethod,
}

/// Authentication middleware function
///
/// Verifies the request under the guard's strategy. On success the
/// [`AuthenticatedClient`] is added to the request extensions; otherwise the
/// strategy's fixed rejection is returned and the handler never runs.
pub async fn auth_middleware<S: UserStore + 'static>(
    State(guard): State<AuthGuard<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthResponse> {
    let (identity, method) = guard
        .auth_manager
        .authenticate(guard.strategy, request.headers())
        .await
        .into_result()?;

    request.extensions_mut().insert(AuthenticatedClient {
        strategy: guard.strategy,
        identity,
        method,
    });

    Ok(next.run(request).await)
}

/// Authentication error response
///
/// Rendered as `{"detail": ...}`. Only the strategy decides the status and
/// message; the rejection reason is not part of the response.
#[derive(Debug)]
pub struct AuthResponse {
    status: StatusCode,
    detail: &'static str,
    basic_challenge: bool,
}

impl AuthResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &'static str {
        self.detail
    }
}

impl From<Rejection> for AuthResponse {
    fn from(rejection: Rejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.detail(),
            basic_challenge: rejection.strategy() == AuthStrategy::Basic,
        }
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.detail }));

        if self.basic_challenge {
            (
                self.status,
                [(header::WWW_AUTHENTICATE, "Basic")],
                body,
            )
                .into_response()
        } else {
            (self.status, body).into_response()
        }
    }
}

/// Logging middleware function
///
/// Logs request and response details including:
/// - Method and path
/// - Status code
/// - Response time
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %uri.path(),
        status = %status.as_u16(),
        duration_ms = %elapsed.as_millis(),
        "Request completed"
    );

    response
}

/// Tracing middleware function
///
/// Creates a span covering the whole request, including the auth guard and
/// any blocking password verification it awaits.
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    use tracing::Instrument;

    let method = request.method().clone();
    let uri = request.uri().clone();

    let span = tracing::info_span!(
        "http_request",
        http.method = %method,
        http.url = %uri,
        http.status_code = tracing::field::Empty,
    );

    async move {
        let response = next.run(request).await;

        tracing::Span::current().record("http.status_code", response.status().as_u16());

        response
    }
    .instrument(span)
    .await
}
