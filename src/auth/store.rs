//! Credential store
//!
//! Holds the registered users. The store is filled once at startup from the
//! configured seeds and never mutated afterwards.

use std::collections::HashMap;

#[cfg(test)]
use mockall::automock;

use crate::config::UserSeed;
use crate::error::HashError;
use crate::models::User;

use super::password::PasswordHasher;

/// Password used to build the dummy hash verified for unknown usernames
const DUMMY_PASSWORD: &str = "aihub-auth-unknown-user";

/// Read-only user lookup
#[cfg_attr(test, automock)]
pub trait UserStore: Send + Sync {
    /// Find a user by exact (case-sensitive) username
    fn lookup(&self, username: &str) -> Option<User>;

    /// A well-formed hash that matches no real password
    ///
    /// Verified in place of a real hash when the username is unknown so that
    /// both failure paths cost the same.
    fn dummy_hash(&self) -> String;
}

/// In-memory credential store
#[derive(Debug, Clone)]
pub struct InMemoryUserStore {
    users: HashMap<String, User>,
    dummy_hash: String,
}

impl InMemoryUserStore {
    /// Build the store from configured seeds
    ///
    /// Plaintext seed passwords are hashed with `hasher`; seeds that already
    /// carry a `password_hash` are stored as-is. Later duplicates of a
    /// username are ignored (`Config::validate` rejects them up front).
    pub fn from_seeds(seeds: &[UserSeed], hasher: &PasswordHasher) -> Result<Self, HashError> {
        let mut users = HashMap::with_capacity(seeds.len());

        for seed in seeds {
            if users.contains_key(&seed.username) {
                tracing::warn!(username = %seed.username, "Duplicate user seed ignored");
                continue;
            }

            let password_hash = match (&seed.password_hash, &seed.password) {
                (Some(hash), _) => hash.clone(),
                (None, Some(password)) => hasher.hash(password)?,
                (None, None) => {
                    return Err(HashError::HashFailed(format!(
                        "no password configured for user {}",
                        seed.username
                    )))
                }
            };

            users.insert(
                seed.username.clone(),
                User::new(seed.username.clone(), password_hash),
            );
        }

        Ok(Self {
            users,
            dummy_hash: hasher.hash(DUMMY_PASSWORD)?,
        })
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no users are registered
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserStore for InMemoryUserStore {
    fn lookup(&self, username: &str) -> Option<User> {
        self.users.get(username).cloned()
    }

    fn dummy_hash(&self) -> String {
        self.dummy_hash.clone()
    }
}
