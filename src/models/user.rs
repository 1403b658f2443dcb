//! User model held by the credential store

use serde::{Deserialize, Serialize};

/// A registered user
///
/// Usernames are unique and compared case-sensitively. The password is only
/// ever held as an Argon2 PHC string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name
    pub username: String,

    /// Salted password hash (PHC format)
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    /// Create a new user from a username and an existing hash
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}
