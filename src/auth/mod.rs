//! Authentication system for aihub-auth
//!
//! This module provides the verification building blocks and the dispatcher
//! that combines them:
//! - Credential store and Argon2id password hashing
//! - Signed (HS256) bearer tokens and the static token allowlist
//! - Header credential extraction and per-endpoint strategies

pub mod credentials;
pub mod manager;
pub mod password;
pub mod static_token;
pub mod store;
pub mod strategy;
pub mod token;

pub use credentials::API_KEY_HEADER;
pub use manager::AuthManager;
pub use password::PasswordHasher;
pub use static_token::StaticTokenAllowlist;
pub use store::{InMemoryUserStore, UserStore};
pub use strategy::{AuthMethod, AuthOutcome, AuthStrategy, Identity, Rejection};
pub use token::TokenSigner;

#[cfg(test)]
pub use store::MockUserStore;
