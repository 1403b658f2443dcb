//! Password hashing and verification
//!
//! Passwords are hashed with Argon2id using a random salt and stored as PHC
//! strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). The cost
//! parameters are the work factor: raising them slows down both legitimate
//! verification and offline brute force.

use std::time::{Duration, Instant};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;

use crate::config::PasswordHashingConfig;
use crate::error::{AuthError, HashError};

/// Argon2id hasher configured with a fixed cost
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    verify_timeout: Duration,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &"argon2id")
            .field("params", self.argon2.params())
            .field("verify_timeout", &self.verify_timeout)
            .finish()
    }
}

impl PasswordHasher {
    /// Create a hasher with the given cost parameters
    ///
    /// # Errors
    ///
    /// Returns `HashError::InvalidParams` if argon2 rejects the parameters
    /// (for example a memory cost below `8 * parallelism` KiB).
    pub fn new(cost: &PasswordHashingConfig) -> Result<Self, HashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| HashError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            verify_timeout: Duration::from_millis(cost.verify_timeout_ms),
        })
    }

    /// Hash a password with a fresh random salt
    ///
    /// # Example
    ///
    /// ```
    /// use aihub_auth::auth::PasswordHasher;
    /// use aihub_auth::config::PasswordHashingConfig;
    ///
    /// let hasher = PasswordHasher::new(&PasswordHashingConfig::default()).unwrap();
    /// let hash = hasher.hash("admin123").unwrap();
    /// assert!(hash.starts_with("$argon2id$"));
    /// assert!(hasher.verify("admin123", &hash));
    /// ```
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::HashFailed(e.to_string()))
    }

    /// Verify a password against a stored PHC hash
    ///
    /// The cost parameters are read from the hash itself, so hashes produced
    /// with a different cost still verify. Returns `false` for a malformed
    /// hash instead of failing. The final digest comparison is constant time.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Verify on the blocking thread pool, bounded by the configured timeout
    ///
    /// Hashing is the one slow step of request handling; running it off the
    /// async workers keeps unrelated requests moving.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the worker panics or the timeout
    /// elapses. The blocking task itself cannot be cancelled and finishes in
    /// the background.
    pub async fn verify_off_thread(
        &self,
        plaintext: String,
        digest: String,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let started = Instant::now();
        let task = tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest));

        let result = match tokio::time::timeout(self.verify_timeout, task).await {
            Ok(Ok(matched)) => Ok(matched),
            Ok(Err(e)) => Err(AuthError::Internal(format!(
                "password verification task failed: {}",
                e
            ))),
            Err(_) => Err(AuthError::Internal(format!(
                "password verification exceeded {} ms",
                self.verify_timeout.as_millis()
            ))),
        };

        tracing::trace!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Password verification finished"
        );

        result
    }
}
