//! HTTP router for aihub-auth
//!
//! One route per authentication scheme, each behind its own guard, plus
//! the unauthenticated health check and the token endpoint.

use axum::{
    async_trait,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AuthManager, AuthStrategy, Rejection, UserStore};
use crate::models::{ProjectInfo, TokenRequest, TokenResponse};

use super::middleware::{auth_middleware, AuthGuard, AuthResponse, AuthenticatedClient};

/// Shared application state
pub struct AppState<S: UserStore> {
    /// Authentication manager
    pub auth_manager: Arc<AuthManager<S>>,

    /// Payload returned by every protected endpoint
    pub project: Arc<ProjectInfo>,
}

impl<S: UserStore> AppState<S> {
    pub fn new(auth_manager: Arc<AuthManager<S>>) -> Self {
        Self {
            auth_manager,
            project: Arc::new(ProjectInfo::ai_hub()),
        }
    }
}

impl<S: UserStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_manager: Arc::clone(&self.auth_manager),
            project: Arc::clone(&self.project),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of a successful call to a guarded endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessResponse {
    /// Strategy label: `none`, `api_key`, `basic`, `oauth2` or `bearer`
    pub auth: String,

    /// Authenticated username, absent for anonymous access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    pub message: String,

    pub data: ProjectInfo,
}

/// Build the main application router
///
/// Guards are attached with `route_layer`, so unknown paths still fall
/// through to a plain 404.
pub fn build_router<S: UserStore + 'static>(state: AppState<S>) -> Router {
    let manager = Arc::clone(&state.auth_manager);
    let guard = move |strategy: AuthStrategy| {
        middleware::from_fn_with_state(
            AuthGuard::new(Arc::clone(&manager), strategy),
            auth_middleware::<S>,
        )
    };

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/public",
            get(access_handler::<S>).route_layer(guard(AuthStrategy::None)),
        )
        .route(
            "/apikey-protected",
            get(access_handler::<S>).route_layer(guard(AuthStrategy::ApiKey)),
        )
        .route(
            "/basic-protected",
            get(access_handler::<S>).route_layer(guard(AuthStrategy::Basic)),
        )
        .route("/token", post(token_handler::<S>))
        .route(
            "/oauth2-protected",
            get(access_handler::<S>).route_layer(guard(AuthStrategy::OAuth2)),
        )
        .route(
            "/bearer-protected",
            get(access_handler::<S>).route_layer(guard(AuthStrategy::Bearer)),
        )
        .with_state(state)
}

/// Health check endpoint handler
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Message returned on successful access under `strategy`
fn access_message(strategy: AuthStrategy, user: Option<&str>) -> String {
    match strategy {
        AuthStrategy::None => "Publicly accessible AI Hub details".to_string(),
        AuthStrategy::ApiKey => "You accessed AI Hub data with an API Key".to_string(),
        AuthStrategy::Basic => format!(
            "Hello {}, you accessed AI Hub data with Basic Auth",
            user.unwrap_or_default()
        ),
        AuthStrategy::Login => "Token issued".to_string(),
        AuthStrategy::OAuth2 => "You accessed AI Hub data with OAuth2".to_string(),
        AuthStrategy::Bearer => "You accessed AI Hub data with Bearer token".to_string(),
    }
}

/// Shared handler for every guarded GET endpoint
///
/// The guard has already run; the response only depends on which strategy
/// admitted the caller and who they are.
async fn access_handler<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(client): Extension<AuthenticatedClient>,
) -> Json<AccessResponse> {
    let user = client.identity.username().map(str::to_string);

    Json(AccessResponse {
        auth: client.strategy.label().to_string(),
        message: access_message(client.strategy, user.as_deref()),
        user,
        data: state.project.as_ref().clone(),
    })
}

/// Login body, accepted as JSON or as a urlencoded form
#[derive(Debug)]
pub struct LoginRequest(pub TokenRequest);

#[async_trait]
impl<St: Send + Sync> FromRequest<St> for LoginRequest {
    type Rejection = Response;

    async fn from_request(req: Request, state: &St) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let parsed = if is_json {
            Json::<TokenRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.body_text())
        } else {
            Form::<TokenRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.body_text())
        };

        parsed.map(LoginRequest).map_err(|detail| {
            tracing::debug!(detail = %detail, "Unparsable login body");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "detail": detail })),
            )
                .into_response()
        })
    }
}

/// Token endpoint: exchange username and password for a signed token
async fn token_handler<S: UserStore + 'static>(
    State(state): State<AppState<S>>,
    LoginRequest(body): LoginRequest,
) -> Result<Json<TokenResponse>, AuthResponse> {
    state
        .auth_manager
        .login(&body.username, &body.password)
        .await
        .map(|issued| Json(TokenResponse::from(issued)))
        .map_err(|reason| AuthResponse::from(Rejection::new(AuthStrategy::Login, reason)))
}
