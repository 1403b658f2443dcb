//! Configuration management for aihub-auth
//!
//! This module handles loading, parsing, and validating application configuration
//! from YAML files and environment variables. Secrets (API key, token signing
//! secret, user passwords) are supplied here rather than compiled in.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable prefix
const ENV_PREFIX: &str = "AIHUB_AUTH_";

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// OpenTelemetry configuration
    #[serde(default)]
    pub otel: OtelConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix AIHUB_AUTH_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(host) = env_var("SERVER_HOST") {
            config.server.host = host;
        }
        if let Some(port) = env_var("SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }

        if let Some(api_key) = env_var("API_KEY") {
            config.auth.api_key = api_key;
        }
        if let Some(secret) = env_var("TOKEN_SECRET") {
            config.auth.token.secret = Some(secret);
        }
        if let Some(ttl) = env_var("TOKEN_TTL_SECS") {
            config.auth.token.ttl_secs = ttl
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid token TTL".to_string()))?;
        }
        if let Some(password) = env_var("ADMIN_PASSWORD") {
            config.auth.users.push(UserSeed {
                username: "admin".to_string(),
                password: Some(password),
                password_hash: None,
            });
        }
        if let Some(token) = env_var("STATIC_TOKEN") {
            config.auth.static_token = Some(StaticTokenConfig {
                token,
                identity: default_static_identity(),
            });
        }

        if let Some(enabled) = env_var("OTEL_ENABLED") {
            config.otel.enabled = enabled
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid OTel enabled flag".to_string()))?;
        }
        if let Some(endpoint) = env_var("OTEL_ENDPOINT") {
            config.otel.endpoint = Some(endpoint);
        }

        if let Some(level) = env_var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Check that the values the service cannot run without are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth.token.secret.as_deref() {
            Some(secret) if !secret.is_empty() => {}
            _ => {
                return Err(ConfigError::MissingRequired(
                    "auth.token.secret".to_string(),
                ))
            }
        }

        if self.auth.api_key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "auth.api_key must not be empty".to_string(),
            ));
        }

        if self.auth.token.ttl_secs == 0 || self.auth.token.ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "auth.token.ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }

        if let Some(static_token) = &self.auth.static_token {
            if static_token.token.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "auth.static_token.token must not be empty".to_string(),
                ));
            }
        }

        let mut seen = HashSet::new();
        for user in &self.auth.users {
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "duplicate username: {}",
                    user.username
                )));
            }
            if user.password.is_none() && user.password_hash.is_none() {
                return Err(ConfigError::MissingRequired(format!(
                    "password or password_hash for user {}",
                    user.username
                )));
            }
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on the time spent handling one request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Value expected in the `x-api-key` header
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Signed token settings
    #[serde(default)]
    pub token: TokenConfig,

    /// Pre-issued token accepted without verification (disabled when absent)
    #[serde(default)]
    pub static_token: Option<StaticTokenConfig>,

    /// Users seeded into the credential store at startup
    #[serde(default)]
    pub users: Vec<UserSeed>,

    /// Password hashing cost
    #[serde(default)]
    pub password_hashing: PasswordHashingConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            token: TokenConfig::default(),
            static_token: None,
            users: Vec::new(),
            password_hashing: PasswordHashingConfig::default(),
        }
    }
}

fn default_api_key() -> String {
    "test-api-key".to_string()
}

/// Signed token configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenConfig {
    /// HMAC-SHA256 signing secret
    pub secret: Option<String>,

    /// Token lifetime in seconds
    #[serde(default = "default_token_ttl")]
    pub ttl_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl_secs: default_token_ttl(),
        }
    }
}

fn default_token_ttl() -> u64 {
    3600
}

/// Static (never-expiring) token configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaticTokenConfig {
    /// Exact token value
    pub token: String,

    /// Identity granted to holders of the token
    #[serde(default = "default_static_identity")]
    pub identity: String,
}

fn default_static_identity() -> String {
    "admin".to_string()
}

/// A user to register at startup
///
/// Either `password` (hashed at startup) or `password_hash` (Argon2 PHC
/// string) must be given. `password_hash` wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSeed {
    pub username: String,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub password_hash: Option<String>,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PasswordHashingConfig {
    /// Memory cost in KiB
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Number of passes
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Maximum wall-clock time for one verification, in milliseconds
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_ms: u64,
}

impl Default for PasswordHashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            verify_timeout_ms: default_verify_timeout(),
        }
    }
}

// argon2 crate defaults (OWASP minimum for Argon2id)
fn default_memory_kib() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_verify_timeout() -> u64 {
    5000
}

/// OpenTelemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtelConfig {
    /// Whether OpenTelemetry is enabled
    #[serde(default)]
    pub enabled: bool,

    /// OTLP endpoint URL
    pub endpoint: Option<String>,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            service_name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "aihub-auth".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (`json` or `pretty`)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax. Unset variables are left as-is.
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.auth.token.secret = Some("unit-test-secret".to_string());
        config.auth.users.push(UserSeed {
            username: "admin".to_string(),
            password: Some("admin123".to_string()),
            password_hash: None,
        });
        config
    }

    #[test]
    fn test_parse_complete_yaml_config() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9090
  request_timeout_secs: 10

auth:
  api_key: "another-key"
  token:
    secret: "s3cr3t"
    ttl_secs: 600
  static_token:
    token: "static-abc"
    identity: "root"
  users:
    - username: admin
      password: admin123
    - username: ops
      password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA"
  password_hashing:
    memory_kib: 8192
    iterations: 3
    parallelism: 2
    verify_timeout_ms: 250

otel:
  enabled: true
  endpoint: "http://localhost:4317"
  service_name: "test-service"

logging:
  level: "debug"
  format: "pretty"
"#;

        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.request_timeout_secs, 10);

        assert_eq!(config.auth.api_key, "another-key");
        assert_eq!(config.auth.token.secret, Some("s3cr3t".to_string()));
        assert_eq!(config.auth.token.ttl_secs, 600);

        let static_token = config.auth.static_token.as_ref().unwrap();
        assert_eq!(static_token.token, "static-abc");
        assert_eq!(static_token.identity, "root");

        assert_eq!(config.auth.users.len(), 2);
        assert_eq!(config.auth.users[0].password, Some("admin123".to_string()));
        assert!(config.auth.users[1].password.is_none());
        assert!(config.auth.users[1].password_hash.is_some());

        assert_eq!(config.auth.password_hashing.memory_kib, 8192);
        assert_eq!(config.auth.password_hashing.iterations, 3);
        assert_eq!(config.auth.password_hashing.parallelism, 2);
        assert_eq!(config.auth.password_hashing.verify_timeout_ms, 250);

        assert!(config.otel.enabled);
        assert_eq!(
            config.otel.endpoint,
            Some("http://localhost:4317".to_string())
        );

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_default_values_applied() {
        let yaml = r#"
server:
  port: 3000
"#;

        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 30);

        assert_eq!(config.auth.api_key, "test-api-key");
        assert_eq!(config.auth.token.secret, None);
        assert_eq!(config.auth.token.ttl_secs, 3600);
        assert!(config.auth.static_token.is_none());
        assert!(config.auth.users.is_empty());
        assert_eq!(config.auth.password_hashing.memory_kib, 19456);
        assert_eq!(config.auth.password_hashing.iterations, 2);
        assert_eq!(config.auth.password_hashing.parallelism, 1);

        assert!(!config.otel.enabled);
        assert_eq!(config.otel.service_name, "aihub-auth");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_static_token_identity_defaults_to_admin() {
        let yaml = r#"
auth:
  static_token:
    token: "abc"
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.auth.static_token.unwrap().identity, "admin");
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("TEST_AIHUB_TOKEN_SECRET", "env_secret");

        let yaml = r#"
auth:
  token:
    secret: "${TEST_AIHUB_TOKEN_SECRET}"
"#;

        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.auth.token.secret, Some("env_secret".to_string()));

        std::env::remove_var("TEST_AIHUB_TOKEN_SECRET");
    }

    #[test]
    fn test_unset_env_var_left_untouched() {
        let expanded = expand_env_vars("secret: ${AIHUB_AUTH_TEST_NEVER_SET_VAR}");
        assert_eq!(expanded, "secret: ${AIHUB_AUTH_TEST_NEVER_SET_VAR}");
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("AIHUB_AUTH_SERVER_HOST", "localhost");
        std::env::set_var("AIHUB_AUTH_SERVER_PORT", "9999");
        std::env::set_var("AIHUB_AUTH_API_KEY", "env-key");
        std::env::set_var("AIHUB_AUTH_TOKEN_SECRET", "env-secret");
        std::env::set_var("AIHUB_AUTH_TOKEN_TTL_SECS", "120");
        std::env::set_var("AIHUB_AUTH_ADMIN_PASSWORD", "admin123");
        std::env::set_var("AIHUB_AUTH_STATIC_TOKEN", "static-env");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.auth.api_key, "env-key");
        assert_eq!(config.auth.token.secret, Some("env-secret".to_string()));
        assert_eq!(config.auth.token.ttl_secs, 120);
        assert_eq!(config.auth.users.len(), 1);
        assert_eq!(config.auth.users[0].username, "admin");
        let static_token = config.auth.static_token.as_ref().unwrap();
        assert_eq!(static_token.token, "static-env");
        assert_eq!(static_token.identity, "admin");
        assert!(config.validate().is_ok());

        std::env::set_var("AIHUB_AUTH_OTEL_ENABLED", "true");
        assert!(Config::from_env().unwrap().otel.enabled);
        std::env::set_var("AIHUB_AUTH_OTEL_ENABLED", "yes");
        assert!(matches!(Config::from_env(), Err(ConfigError::Parse(_))));
        std::env::remove_var("AIHUB_AUTH_OTEL_ENABLED");

        std::env::remove_var("AIHUB_AUTH_SERVER_HOST");
        std::env::remove_var("AIHUB_AUTH_SERVER_PORT");
        std::env::remove_var("AIHUB_AUTH_API_KEY");
        std::env::remove_var("AIHUB_AUTH_TOKEN_SECRET");
        std::env::remove_var("AIHUB_AUTH_TOKEN_TTL_SECS");
        std::env::remove_var("AIHUB_AUTH_ADMIN_PASSWORD");
        std::env::remove_var("AIHUB_AUTH_STATIC_TOKEN");
    }

    #[test]
    fn test_parse_error_invalid_yaml() {
        let yaml = r#"
server:
  port: "not_a_number"
"#;

        let result = Config::from_yaml(yaml);
        match result {
            Err(ConfigError::Parse(msg)) => {
                assert!(msg.contains("Failed to parse YAML"));
            }
            _ => panic!("Expected ConfigError::Parse"),
        }
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "auth:\n  api_key: file-key\n  token:\n    secret: file-secret").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.auth.api_key, "file-key");
        assert_eq!(config.auth.token.secret, Some("file-secret".to_string()));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/aihub-auth.yaml");
        assert!(matches!(result, Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_token_secret() {
        let mut config = valid_config();
        config.auth.token.secret = None;
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingRequired("auth.token.secret".to_string()))
        );

        config.auth.token.secret = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_token_ttl() {
        let mut config = valid_config();

        config.auth.token.ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.auth.token.ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.token.ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));

        config.auth.token.ttl_secs = i64::MAX as u64;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validate_rejects_empty_api_key() {
        let mut config = valid_config();
        config.auth.api_key = String::new();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_usernames() {
        let mut config = valid_config();
        config.auth.users.push(UserSeed {
            username: "admin".to_string(),
            password: Some("other".to_string()),
            password_hash: None,
        });

        match config.validate() {
            Err(ConfigError::InvalidValue(msg)) => assert!(msg.contains("duplicate")),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_usernames_are_case_sensitive() {
        let mut config = valid_config();
        config.auth.users.push(UserSeed {
            username: "Admin".to_string(),
            password: Some("other".to_string()),
            password_hash: None,
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_user_password() {
        let mut config = valid_config();
        config.auth.users.push(UserSeed {
            username: "nopass".to_string(),
            password: None,
            password_hash: None,
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = valid_config();

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_empty_yaml_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config, Config::default());
    }
}
