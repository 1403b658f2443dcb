//! Domain models for aihub-auth
//!
//! This module contains the core domain models used throughout the application.

pub mod project;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use project::{ProjectInfo, TeamMember};
pub use token::{Claims, IssuedToken, TokenRequest, TokenResponse, TOKEN_TYPE};
pub use user::User;
