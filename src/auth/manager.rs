//! Authentication manager
//!
//! Dispatches a request to the verification policy of its endpoint and turns
//! the result into a uniform [`AuthOutcome`]. All state held here is built
//! once at startup and only read afterwards.

use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{self, ConfigError};
use crate::error::{AppError, AuthError};
use crate::models::IssuedToken;
use crate::otel::AuthMetrics;

use super::credentials;
use super::password::PasswordHasher;
use super::static_token::{ct_eq, StaticTokenAllowlist};
use super::store::{InMemoryUserStore, UserStore};
use super::strategy::{AuthMethod, AuthOutcome, AuthStrategy, Identity, Rejection};
use super::token::TokenSigner;

/// Authentication manager
///
/// Owns the credential store, password hasher, token signer and the optional
/// static token, and verifies requests against them.
pub struct AuthManager<S: UserStore> {
    store: Arc<S>,
    hasher: PasswordHasher,
    signer: TokenSigner,
    api_key: String,
    static_token: Option<StaticTokenAllowlist>,
    metrics: Option<AuthMetrics>,
}

impl AuthManager<InMemoryUserStore> {
    /// Build a manager from the `auth` configuration section
    ///
    /// Seed passwords are hashed here, so this is as slow as one hash per
    /// seeded user.
    pub fn from_config(config: &config::AuthConfig) -> Result<Self, AppError> {
        let secret = config
            .token
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("auth.token.secret".to_string()))?;

        let hasher = PasswordHasher::new(&config.password_hashing)?;
        let store = InMemoryUserStore::from_seeds(&config.users, &hasher)?;
        let signer = TokenSigner::new(secret.as_bytes(), config.token.ttl_secs);

        info!(
            users = store.len(),
            ttl_secs = config.token.ttl_secs,
            static_token = config.static_token.is_some(),
            "Authentication manager initialized"
        );

        let manager = Self::new(Arc::new(store), hasher, signer, config.api_key.clone());
        Ok(match StaticTokenAllowlist::from_config(config.static_token.as_ref()) {
            Some(allowlist) => manager.with_static_token(allowlist),
            None => manager,
        })
    }
}

impl<S: UserStore> AuthManager<S> {
    /// Create a new authentication manager without a static token
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        signer: TokenSigner,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            hasher,
            signer,
            api_key: api_key.into(),
            static_token: None,
            metrics: None,
        }
    }

    /// Accept `allowlist` on bearer endpoints in addition to signed tokens
    pub fn with_static_token(mut self, allowlist: StaticTokenAllowlist) -> Self {
        self.static_token = Some(allowlist);
        self
    }

    /// Record attempts and hash timings into `metrics`
    pub fn with_metrics(mut self, metrics: AuthMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Token signer used by `login`
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }

    /// Verify a request under `strategy`
    ///
    /// `Login` takes its credentials from the request body and goes through
    /// [`AuthManager::login`]; called here it is always rejected.
    pub async fn authenticate(&self, strategy: AuthStrategy, headers: &HeaderMap) -> AuthOutcome {
        let result = match strategy {
            AuthStrategy::None => Ok((Identity::Anonymous, AuthMethod::None)),
            AuthStrategy::ApiKey => credentials::api_key(headers)
                .and_then(|key| self.verify_api_key(key))
                .map(|()| (Identity::Anonymous, AuthMethod::ApiKey)),
            AuthStrategy::Basic => match credentials::basic(headers) {
                Ok((username, password)) => self
                    .verify_credentials(&username, &password)
                    .await
                    .map(|()| (Identity::User(username), AuthMethod::Password)),
                Err(e) => Err(e),
            },
            AuthStrategy::Login => Err(AuthError::MissingCredential),
            AuthStrategy::OAuth2 | AuthStrategy::Bearer => {
                credentials::bearer(headers).and_then(|token| self.verify_bearer(token))
            }
        };

        let outcome = match result {
            Ok((identity, method)) => AuthOutcome::Authenticated { identity, method },
            Err(reason) => {
                debug!(strategy = strategy.label(), reason = %reason, "Authentication rejected");
                AuthOutcome::Rejected(Rejection::new(strategy, reason))
            }
        };

        self.record(strategy, &outcome);
        outcome
    }

    /// Exchange a username and password for a signed token
    ///
    /// # Errors
    ///
    /// Any failure, including an unknown user, surfaces as the internal
    /// reason; callers map all of them to one response.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let result = match self.verify_credentials(username, password).await {
            Ok(()) => self.signer.issue(username),
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(_) => {
                info!(username = %username, "Token issued");
                AuthOutcome::Authenticated {
                    identity: Identity::User(username.to_string()),
                    method: AuthMethod::Password,
                }
            }
            Err(reason) => {
                debug!(reason = %reason, "Login rejected");
                AuthOutcome::Rejected(Rejection::new(AuthStrategy::Login, reason.clone()))
            }
        };
        self.record(AuthStrategy::Login, &outcome);

        result
    }

    /// Constant-time comparison against the configured API key
    pub fn verify_api_key(&self, key: &str) -> Result<(), AuthError> {
        if ct_eq(key.as_bytes(), self.api_key.as_bytes()) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }

    /// Check a username and password against the store
    ///
    /// An unknown username is verified against the store's dummy hash, so it
    /// costs one hash verification just like a wrong password.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let (digest, known) = match self.store.lookup(username) {
            Some(user) => (user.password_hash, true),
            None => (self.store.dummy_hash(), false),
        };

        let started = Instant::now();
        let matched = self
            .hasher
            .verify_off_thread(password.to_string(), digest)
            .await;
        if let Some(metrics) = &self.metrics {
            metrics.record_password_verify(started.elapsed().as_secs_f64());
        }

        if matched? && known {
            Ok(())
        } else {
            Err(AuthError::InvalidCredential)
        }
    }

    /// Accept the static token, or else a signed token
    pub fn verify_bearer(&self, token: &str) -> Result<(Identity, AuthMethod), AuthError> {
        self.verify_bearer_at(token, Utc::now())
    }

    /// `verify_bearer` as if the current time were `now`
    ///
    /// The static token is checked first and ignores `now`.
    pub fn verify_bearer_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(Identity, AuthMethod), AuthError> {
        if let Some(allowlist) = &self.static_token {
            if allowlist.matches(token) {
                return Ok((
                    Identity::User(allowlist.identity().to_string()),
                    AuthMethod::StaticToken,
                ));
            }
        }

        let claims = self.signer.verify_at(token, now)?;
        Ok((Identity::User(claims.sub), AuthMethod::SignedToken))
    }

    fn record(&self, strategy: AuthStrategy, outcome: &AuthOutcome) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        let method = match outcome {
            AuthOutcome::Authenticated { method, .. } => method.label(),
            AuthOutcome::Rejected(_) => AuthMethod::None.label(),
        };
        metrics.record_attempt(strategy.label(), method, outcome.label());
    }
}
