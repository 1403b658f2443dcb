//! Common test utilities and helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use aihub_auth::auth::{AuthManager, InMemoryUserStore};
use aihub_auth::config::{
    AuthConfig, PasswordHashingConfig, ServerConfig, StaticTokenConfig, TokenConfig, UserSeed,
};
use aihub_auth::server::{AppState, Server};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const STATIC_TOKEN: &str = "static-integration-token";

/// Cheap hashing cost so tests stay fast
pub fn test_hashing() -> PasswordHashingConfig {
    PasswordHashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
        verify_timeout_ms: 5000,
    }
}

/// Auth configuration with the demo user `admin` / `admin123`
pub fn create_test_auth_config() -> AuthConfig {
    AuthConfig {
        api_key: "test-api-key".to_string(),
        token: TokenConfig {
            secret: Some(TEST_SECRET.to_string()),
            ttl_secs: 3600,
        },
        static_token: None,
        users: vec![UserSeed {
            username: "admin".to_string(),
            password: Some("admin123".to_string()),
            password_hash: None,
        }],
        password_hashing: test_hashing(),
    }
}

/// Same as [`create_test_auth_config`] with the static token enabled
pub fn create_test_auth_config_with_static_token() -> AuthConfig {
    AuthConfig {
        static_token: Some(StaticTokenConfig {
            token: STATIC_TOKEN.to_string(),
            identity: "admin".to_string(),
        }),
        ..create_test_auth_config()
    }
}

/// Create a test application state from an auth configuration
pub fn create_test_state(auth: &AuthConfig) -> AppState<InMemoryUserStore> {
    let manager = AuthManager::from_config(auth).expect("Failed to build auth manager");
    AppState::new(Arc::new(manager))
}

/// Create a test server configuration with a random port
pub fn create_test_server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0, // Let OS assign a free port
        ..Default::default()
    }
}

/// Run a test server in the background and return the address
/// The server will be shut down when the returned shutdown sender is dropped or sent
pub async fn run_test_server(
    state: AppState<InMemoryUserStore>,
) -> (std::net::SocketAddr, tokio::sync::oneshot::Sender<()>) {
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get local address");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let server = Server::new(create_test_server_config(), state);

    tokio::spawn(async move {
        server
            .serve(listener, async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server error");
    });

    (addr, shutdown_tx)
}

/// Basic `Authorization` header value for `username:password`
pub fn basic_auth(username: &str, password: &str) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine};
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}
