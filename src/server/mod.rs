//! HTTP server components for aihub-auth
//!
//! This module provides the HTTP server infrastructure including:
//! - Router configuration and route handlers
//! - Authentication guards and logging middleware
//! - Server lifecycle management

pub mod middleware;
pub mod router;

pub use middleware::{AuthGuard, AuthResponse, AuthenticatedClient};
pub use router::{build_router, AccessResponse, AppState, HealthResponse};

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::auth::UserStore;
use crate::config::ServerConfig;

/// HTTP Server for aihub-auth
///
/// Manages the axum server lifecycle, including:
/// - Binding to the configured address
/// - Applying middleware layers
/// - Graceful shutdown handling
pub struct Server<S: UserStore + 'static> {
    config: ServerConfig,
    state: AppState<S>,
}

impl<S: UserStore + 'static> Server<S> {
    /// Create a new server instance
    pub fn new(config: ServerConfig, state: AppState<S>) -> Self {
        Self { config, state }
    }

    /// Bind a listener on the configured host and port
    ///
    /// The host may be an IP literal or a name such as `localhost`; names are
    /// resolved and never widened to the wildcard address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let host = self.config.host.as_str();
        TcpListener::bind((host, self.config.port))
            .await
            .map_err(|e| ServerError::Bind(format!("{}:{}: {}", host, self.config.port, e)))
    }

    /// Router with every middleware layer applied
    pub fn app(&self) -> Router {
        build_router(self.state.clone())
            .layer(axum::middleware::from_fn(middleware::logging_middleware))
            .layer(axum::middleware::from_fn(middleware::tracing_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .layer(tower_http::compression::CompressionLayer::new())
    }

    /// Run the server until the shutdown future resolves
    ///
    /// # Returns
    ///
    /// Ok(()) if the server shuts down gracefully, Err on bind or serve failure
    pub async fn run(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let app = self.app();

        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Server listening on {}", addr);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to address
    #[error("Failed to bind to address: {0}")]
    Bind(String),

    /// Failed to serve requests
    #[error("Server error: {0}")]
    Serve(String),
}
