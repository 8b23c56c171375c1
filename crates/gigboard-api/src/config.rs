//! API configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration problems that abort startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,

    #[error("Unknown STORE_BACKEND '{0}' (expected 'memory' or 'firestore')")]
    UnknownStoreBackend(String),
}

/// Document store backing the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "memory" => Ok(StoreBackend::Memory),
            "firestore" => Ok(StoreBackend::Firestore),
            other => Err(ConfigError::UnknownStoreBackend(other.to_string())),
        }
    }
}

/// API server configuration.
#[derive(Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// HS256 secret shared with the token issuer
    pub jwt_secret: String,
    pub store_backend: StoreBackend,
    /// Enables Redis Pub/Sub fan-out when set
    pub redis_url: Option<String>,
    pub redis_channel_prefix: String,
    pub metrics_enabled: bool,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout", &self.request_timeout)
            .field("max_body_size", &self.max_body_size)
            .field("environment", &self.environment)
            .field("jwt_secret", &"<redacted>")
            .field("store_backend", &self.store_backend)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<set>"))
            .field("redis_channel_prefix", &self.redis_channel_prefix)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

impl ApiConfig {
    /// Defaults with the given signing secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MiB
            environment: "development".to_string(),
            jwt_secret: jwt_secret.into(),
            store_backend: StoreBackend::Memory,
            redis_url: None,
            redis_channel_prefix: String::new(),
            metrics_enabled: true,
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let defaults = Self::with_secret(jwt_secret);

        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            request_timeout: std::env::var("REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            jwt_secret: defaults.jwt_secret,
            store_backend: std::env::var("STORE_BACKEND")
                .map(|s| s.parse())
                .unwrap_or(Ok(defaults.store_backend))?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            redis_channel_prefix: std::env::var("REDIS_CHANNEL_PREFIX").unwrap_or_default(),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "JWT_SECRET",
        "API_PORT",
        "CORS_ORIGINS",
        "STORE_BACKEND",
        "REDIS_URL",
        "METRICS_ENABLED",
        "ENVIRONMENT",
    ];

    fn clear() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_missing_secret_is_an_error() {
        clear();
        assert_eq!(ApiConfig::from_env().unwrap_err(), ConfigError::MissingJwtSecret);

        std::env::set_var("JWT_SECRET", "  ");
        assert_eq!(ApiConfig::from_env().unwrap_err(), ConfigError::MissingJwtSecret);
        clear();
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        std::env::set_var("JWT_SECRET", "s3cret");

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.redis_url.is_none());
        assert!(config.metrics_enabled);
        assert!(!config.is_production());
        assert!(!format!("{:?}", config).contains("s3cret"));
        clear();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear();
        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("API_PORT", "9000");
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example");
        std::env::set_var("STORE_BACKEND", "Firestore");
        std::env::set_var("REDIS_URL", "redis://localhost:6379");
        std::env::set_var("METRICS_ENABLED", "false");
        std::env::set_var("ENVIRONMENT", "Production");

        let config = ApiConfig::from_env().unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.store_backend, StoreBackend::Firestore);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert!(!config.metrics_enabled);
        assert!(config.is_production());
        clear();
    }

    #[test]
    #[serial]
    fn test_unknown_backend() {
        clear();
        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("STORE_BACKEND", "mongo");
        assert_eq!(
            ApiConfig::from_env().unwrap_err(),
            ConfigError::UnknownStoreBackend("mongo".to_string())
        );
        clear();
    }
}
