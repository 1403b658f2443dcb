//! Static token allowlist
//!
//! A single pre-issued token that is accepted as-is, without signature or
//! expiry checks, and authenticates as a fixed identity. It never expires,
//! so it is only active when explicitly configured.

use subtle::ConstantTimeEq;

use crate::config::StaticTokenConfig;

/// Exact-match allowlist holding one token
#[derive(Clone)]
pub struct StaticTokenAllowlist {
    token: String,
    identity: String,
}

impl std::fmt::Debug for StaticTokenAllowlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAllowlist")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .finish()
    }
}

impl StaticTokenAllowlist {
    pub fn new(token: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            identity: identity.into(),
        }
    }

    /// Build the allowlist from configuration, `None` when not configured
    pub fn from_config(config: Option<&StaticTokenConfig>) -> Option<Self> {
        config.map(|c| Self::new(c.token.clone(), c.identity.clone()))
    }

    /// Whether `token` is the allowlisted value (constant-time comparison)
    pub fn matches(&self, token: &str) -> bool {
        ct_eq(token.as_bytes(), self.token.as_bytes())
    }

    /// Identity granted on a match
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Constant-time comparison of two byte slices
///
/// Lengths are compared first; only the content comparison is constant time.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_value_only() {
        let allowlist = StaticTokenAllowlist::new("static-abc", "admin");

        assert!(allowlist.matches("static-abc"));
        assert!(!allowlist.matches("static-abd"));
        assert!(!allowlist.matches("static-ab"));
        assert!(!allowlist.matches("static-abcd"));
        assert!(!allowlist.matches("STATIC-ABC"));
        assert!(!allowlist.matches(""));
    }

    #[test]
    fn test_identity() {
        let allowlist = StaticTokenAllowlist::new("static-abc", "root");
        assert_eq!(allowlist.identity(), "root");
    }

    #[test]
    fn test_from_config() {
        assert!(StaticTokenAllowlist::from_config(None).is_none());

        let config = StaticTokenConfig {
            token: "tok".to_string(),
            identity: "admin".to_string(),
        };
        let allowlist = StaticTokenAllowlist::from_config(Some(&config)).unwrap();
        assert!(allowlist.matches("tok"));
        assert_eq!(allowlist.identity(), "admin");
    }

    #[test]
    fn test_debug_redacts_token() {
        let allowlist = StaticTokenAllowlist::new("super-secret-token", "admin");
        let debug = format!("{:?}", allowlist);

        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn test_ct_eq() {
        assert!(ct_eq(b"abc", b"abc"));
        assert!(!ct_eq(b"abc", b"abd"));
        assert!(!ct_eq(b"abc", b"ab"));
        assert!(ct_eq(b"", b""));
    }
}
