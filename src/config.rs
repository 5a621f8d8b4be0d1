//! Configuration for the ViSearch client

use crate::error::Result;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
#[derive(Debug, Deserialize)]
pub struct ViSearchConfig {
    /// ViSearch service URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access key (read from env VISEARCH_ACCESS_KEY if not set)
    #[serde(default)]
    pub access_key: Option<String>,

    /// Secret key paired with the access key
    #[serde(default)]
    pub secret_key: Option<SecretString>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Response handling
    #[serde(default)]
    pub response: ResponseConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How response documents are interpreted.
///
/// Built once and handed to the normalizer; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Value of `status` that marks a successful call
    #[serde(default = "default_success_status")]
    pub success_status: String,

    /// Fail with `InconsistentGroupData` when a similar-products response has
    /// more groups than product types. When disabled, the extra groups are kept
    /// without classification metadata.
    #[serde(default = "default_enforce_group_alignment")]
    pub enforce_group_alignment: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

// Default value functions
fn default_base_url() -> String { "https://visearch.visenze.com".to_string() }
fn default_timeout_ms() -> u64 { 10_000 }
fn default_user_agent() -> String { format!("visearch-rust/{}", env!("CARGO_PKG_VERSION")) }
fn default_success_status() -> String { "OK".to_string() }
fn default_enforce_group_alignment() -> bool { true }
fn default_log_level() -> String { "info".to_string() }

impl Default for ViSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key: None,
            secret_key: None,
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            response: ResponseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            success_status: default_success_status(),
            enforce_group_alignment: default_enforce_group_alignment(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ViSearchConfig {
    /// Create a configuration for the given key pair with defaults elsewhere
    pub fn with_keys(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: Some(access_key.into()),
            secret_key: Some(SecretString::new(secret_key.into())),
            ..Self::default()
        }
    }

    /// Load configuration from an optional file plus `VISEARCH__*` variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Nested keys use a double underscore, e.g. `VISEARCH__RESPONSE__SUCCESS_STATUS`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("VISEARCH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Override fields from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("VISEARCH_BASE_URL") {
            self.base_url = val;
        }

        if let Ok(val) = std::env::var("VISEARCH_ACCESS_KEY") {
            self.access_key = Some(val);
        }

        if let Ok(val) = std::env::var("VISEARCH_SECRET_KEY") {
            self.secret_key = Some(SecretString::new(val));
        }

        if let Ok(val) = std::env::var("VISEARCH_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                self.timeout_ms = timeout;
            }
        }

        if let Ok(val) = std::env::var("VISEARCH_SUCCESS_STATUS") {
            self.response.success_status = val;
        }

        if let Ok(val) = std::env::var("VISEARCH_ENFORCE_GROUP_ALIGNMENT") {
            self.response.enforce_group_alignment = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("VISEARCH_LOG_JSON") {
            self.logging.json = val.to_lowercase() == "true" || val == "1";
        }

        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = ViSearchConfig::default();
        assert_eq!(config.base_url, "https://visearch.visenze.com");
        assert_eq!(config.timeout_ms, 10_000);
        assert!(config.access_key.is_none());
        assert!(config.user_agent.starts_with("visearch-rust/"));
        assert_eq!(config.response.success_status, "OK");
        assert!(config.response.enforce_group_alignment);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_with_keys() {
        let config = ViSearchConfig::with_keys("access", "secret");
        assert_eq!(config.access_key.as_deref(), Some("access"));
        assert_eq!(
            config.secret_key.as_ref().map(|s| s.expose_secret().as_str()),
            Some("secret")
        );
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = ViSearchConfig::with_keys("access", "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("VISEARCH_BASE_URL", "http://custom:9000");
        std::env::set_var("VISEARCH_ACCESS_KEY", "env-access");
        std::env::set_var("VISEARCH_TIMEOUT_MS", "3000");
        std::env::set_var("VISEARCH_ENFORCE_GROUP_ALIGNMENT", "false");

        let config = ViSearchConfig::default().from_env();

        assert_eq!(config.base_url, "http://custom:9000");
        assert_eq!(config.access_key, Some("env-access".to_string()));
        assert_eq!(config.timeout_ms, 3000);
        assert!(!config.response.enforce_group_alignment);

        // Cleanup
        std::env::remove_var("VISEARCH_BASE_URL");
        std::env::remove_var("VISEARCH_ACCESS_KEY");
        std::env::remove_var("VISEARCH_TIMEOUT_MS");
        std::env::remove_var("VISEARCH_ENFORCE_GROUP_ALIGNMENT");
    }

    #[test]
    fn test_response_config_deserializes_with_defaults() {
        let config: ResponseConfig = serde_json::from_str(r#"{"success_status":"ok"}"#).unwrap();
        assert_eq!(config.success_status, "ok");
        assert!(config.enforce_group_alignment);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "base_url = \"http://file-config:8000\"\ntimeout_ms = 2500\n\n[response]\nenforce_group_alignment = false\n"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = ViSearchConfig::load(Some(&path)).unwrap();

        assert_eq!(config.base_url, "http://file-config:8000");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.response.success_status, "OK");
        assert!(!config.response.enforce_group_alignment);
    }

    #[test]
    fn test_duration_conversion() {
        let config = ViSearchConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(10_000));
    }
}
