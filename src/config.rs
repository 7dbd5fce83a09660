//! Configuration management for hublink
//!
//! This module loads the Hub project configuration from environment variables
//! with sensible defaults. Configuration covers the enabled platform features,
//! the control-plane URL, the endpoint secret, and the deployment preset knobs.
//!
//! # Environment Variables
//!
//! ## Project Configuration
//! - `HUBLINK_URL`: Control-plane base URL - default: "https://admin.hublink.dev"
//! - `HUBLINK_PROJECT_SECRET_KEY`: Bearer secret protecting the AI endpoint - required outside dev
//! - `HUBLINK_DIR`: Local hub directory relative to the project root - default: ".hub"
//! - `HUBLINK_REMOTE`: Use remote bindings during development (true|false) - default: "false"
//! - `HUBLINK_DEV`: Treat the process as a development build (true|false) - default: "false"
//!
//! ## Feature Flags
//! `HUBLINK_AI`, `HUBLINK_ANALYTICS`, `HUBLINK_BLOB`, `HUBLINK_BROWSER`,
//! `HUBLINK_CACHE`, `HUBLINK_DATABASE`, `HUBLINK_KV`, `HUBLINK_VECTORIZE`,
//! `HUBLINK_BINDINGS` (true|false) - all default: "false"
//!
//! ## Deployment Preset
//! - `HUBLINK_PRESET`: Explicit preset override (hyphens are normalized to underscores)
//! - `HUBLINK_WORKERS`: Target the single-worker runtime (true|false) - default: "false"
//! - `HUBLINK_WEBSOCKET`: Enable websocket support, requires workers (true|false) - default: "false"
//!
//! ## AI Binding
//! - `HUBLINK_AI_ENDPOINT`: Base URL of the AI binding dispatch service - required for `serve`
//! - `HUBLINK_AI_TOKEN`: Bearer token for the dispatch service - optional
//!
//! # Example
//!
//! ```no_run
//! use hublink::HubConfig;
//! use std::env;
//!
//! env::set_var("HUBLINK_AI", "true");
//! env::set_var("HUBLINK_PROJECT_SECRET_KEY", "s3cret");
//!
//! // Load configuration from environment with defaults
//! let config = HubConfig::default();
//! config.validate().expect("Invalid configuration");
//! assert!(config.features.ai);
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_HUB_URL: &str = "https://admin.hublink.dev";
const DEFAULT_HUB_DIR: &str = ".hub";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Control-plane URL missing or empty
    #[error("Hub URL not specified. Set HUBLINK_URL to the control-plane base URL")]
    MissingUrl,

    /// Control-plane URL is not an http(s) URL
    #[error("Invalid Hub URL: {0}. Expected an http:// or https:// URL")]
    InvalidUrl(String),

    /// Hub directory resolved to an empty string
    #[error("Hub directory cannot be empty. Unset HUBLINK_DIR to use the default")]
    EmptyHubDir,

    /// Endpoint secret missing while serving outside dev mode
    #[error("Project secret key not specified. Set HUBLINK_PROJECT_SECRET_KEY to protect the AI endpoint")]
    MissingProjectSecret,

    /// AI dispatch endpoint missing
    #[error("AI endpoint not specified. Set HUBLINK_AI_ENDPOINT to the binding dispatch URL")]
    MissingAiEndpoint,
}

/// Enabled platform features for a Hub project
///
/// Each flag mirrors one managed binding. The record is serialized verbatim
/// into build notifications and into the `hub.config.json` manifest, so the
/// field names here are part of the wire format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub ai: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub blob: bool,
    #[serde(default)]
    pub browser: bool,
    #[serde(default)]
    pub cache: bool,
    #[serde(default)]
    pub database: bool,
    #[serde(default)]
    pub kv: bool,
    #[serde(default)]
    pub vectorize: bool,
    #[serde(default)]
    pub bindings: bool,
}

impl FeatureFlags {
    /// Reads the feature flags from `HUBLINK_*` environment variables
    pub fn from_env() -> Self {
        Self {
            ai: env_bool("HUBLINK_AI"),
            analytics: env_bool("HUBLINK_ANALYTICS"),
            blob: env_bool("HUBLINK_BLOB"),
            browser: env_bool("HUBLINK_BROWSER"),
            cache: env_bool("HUBLINK_CACHE"),
            database: env_bool("HUBLINK_DATABASE"),
            kv: env_bool("HUBLINK_KV"),
            vectorize: env_bool("HUBLINK_VECTORIZE"),
            bindings: env_bool("HUBLINK_BINDINGS"),
        }
    }
}

/// Main configuration structure for hublink
///
/// Holds the project-level settings shared by the AI endpoint and the build
/// hooks. It can be constructed with `Default::default()` which loads from
/// environment variables with fallback defaults, or assembled field by field
/// when embedding the library.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Enabled platform features
    pub features: FeatureFlags,

    /// Control-plane base URL for build notifications
    pub url: String,

    /// Bearer secret protecting the AI endpoint (required outside dev)
    pub project_secret_key: Option<String>,

    /// Local hub directory, relative to the project root
    pub hub_dir: String,

    /// Use remote bindings during development
    pub remote: bool,

    /// Target the single-worker runtime instead of the pages runtime
    pub workers: bool,

    /// Websocket support (only meaningful together with `workers`)
    pub websocket: bool,

    /// Explicit deployment preset override
    pub preset: Option<String>,

    /// Development build (disables platform notifications and endpoint auth)
    pub dev: bool,

    /// Base URL of the AI binding dispatch service
    pub ai_endpoint: Option<String>,

    /// Bearer token for the AI binding dispatch service
    pub ai_token: Option<String>,
}

impl Default for HubConfig {
    /// Creates a new configuration by loading from environment variables with defaults
    fn default() -> Self {
        Self {
            features: FeatureFlags::from_env(),
            url: env_opt("HUBLINK_URL").unwrap_or_else(|| DEFAULT_HUB_URL.to_string()),
            project_secret_key: env_opt("HUBLINK_PROJECT_SECRET_KEY"),
            hub_dir: env_opt("HUBLINK_DIR").unwrap_or_else(|| DEFAULT_HUB_DIR.to_string()),
            remote: env_bool("HUBLINK_REMOTE"),
            workers: env_bool("HUBLINK_WORKERS"),
            websocket: env_bool("HUBLINK_WEBSOCKET"),
            preset: env_opt("HUBLINK_PRESET"),
            dev: env_bool("HUBLINK_DEV"),
            ai_endpoint: env_opt("HUBLINK_AI_ENDPOINT"),
            ai_token: env_opt("HUBLINK_AI_TOKEN"),
        }
    }
}

impl HubConfig {
    /// Validates the configuration
    ///
    /// Checks that the control-plane URL is a plausible http(s) URL and that
    /// the hub directory is non-empty. Serve-specific requirements (endpoint
    /// secret, AI endpoint) are checked where those values are consumed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        if self.hub_dir.trim().is_empty() {
            return Err(ConfigError::EmptyHubDir);
        }
        Ok(())
    }
}

impl fmt::Display for HubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hub Configuration:")?;
        writeln!(f, "  Url: {}", self.url)?;
        writeln!(f, "  Dir: {}", self.hub_dir)?;
        writeln!(f, "  Dev: {}", self.dev)?;
        writeln!(f, "  Remote: {}", self.remote)?;
        writeln!(f, "  Workers: {}", self.workers)?;
        writeln!(f, "  Features: {:?}", self.features)?;
        Ok(())
    }
}

/// Reads a boolean environment variable, treating anything unparsable as false
fn env_bool(key: &str) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<bool>().ok())
        .unwrap_or(false)
}

/// Reads an environment variable, mapping empty or whitespace-only values to None
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn clear(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = vec![
            EnvGuard::clear("HUBLINK_URL"),
            EnvGuard::clear("HUBLINK_DIR"),
            EnvGuard::clear("HUBLINK_DEV"),
            EnvGuard::clear("HUBLINK_AI"),
            EnvGuard::clear("HUBLINK_DATABASE"),
        ];

        let config = HubConfig::default();

        assert_eq!(config.url, DEFAULT_HUB_URL);
        assert_eq!(config.hub_dir, DEFAULT_HUB_DIR);
        assert!(!config.dev);
        assert!(!config.features.ai);
        assert!(!config.features.database);
        assert!(config.preset.is_none());
    }

    #[test]
    #[serial]
    fn test_environment_variable_parsing() {
        let _guards = vec![
            EnvGuard::set("HUBLINK_URL", "https://hub.example.com"),
            EnvGuard::set("HUBLINK_DIR", "data/hub"),
            EnvGuard::set("HUBLINK_AI", "true"),
            EnvGuard::set("HUBLINK_DATABASE", "true"),
            EnvGuard::set("HUBLINK_WORKERS", "true"),
            EnvGuard::set("HUBLINK_PRESET", "custom-preset"),
            EnvGuard::set("HUBLINK_PROJECT_SECRET_KEY", "s3cret"),
        ];

        let config = HubConfig::default();

        assert_eq!(config.url, "https://hub.example.com");
        assert_eq!(config.hub_dir, "data/hub");
        assert!(config.features.ai);
        assert!(config.features.database);
        assert!(!config.features.kv);
        assert!(config.workers);
        assert_eq!(config.preset.as_deref(), Some("custom-preset"));
        assert_eq!(config.project_secret_key.as_deref(), Some("s3cret"));
    }

    #[test]
    #[serial]
    fn test_empty_values_treated_as_unset() {
        let _guards = vec![
            EnvGuard::set("HUBLINK_PROJECT_SECRET_KEY", "   "),
            EnvGuard::set("HUBLINK_PRESET", ""),
            EnvGuard::set("HUBLINK_AI", "yes"),
        ];

        let config = HubConfig::default();

        assert!(config.project_secret_key.is_none());
        assert!(config.preset.is_none());
        // Only literal true/false parse as booleans
        assert!(!config.features.ai);
    }

    #[test]
    fn test_configuration_validation_valid() {
        let config = HubConfig {
            features: FeatureFlags::default(),
            url: "https://admin.hublink.dev".to_string(),
            project_secret_key: Some("s3cret".to_string()),
            hub_dir: ".hub".to_string(),
            remote: false,
            workers: false,
            websocket: false,
            preset: None,
            dev: false,
            ai_endpoint: None,
            ai_token: None,
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_configuration_validation_invalid_url() {
        let mut config = HubConfig::default();
        config.url = "ftp://admin.hublink.dev".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingUrl)));
    }

    #[test]
    #[serial]
    fn test_configuration_validation_empty_dir() {
        let mut config = HubConfig::default();
        config.url = "https://admin.hublink.dev".to_string();
        config.hub_dir = "".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::EmptyHubDir)));
    }

    #[test]
    fn test_feature_flags_serialize_as_flat_record() {
        let flags = FeatureFlags {
            ai: true,
            database: true,
            ..FeatureFlags::default()
        };

        let value = serde_json::to_value(flags).unwrap();
        assert_eq!(value["ai"], true);
        assert_eq!(value["database"], true);
        assert_eq!(value["kv"], false);
        assert_eq!(value.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_feature_flags_deserialize_with_missing_fields() {
        let flags: FeatureFlags = serde_json::from_str(r#"{"ai": true}"#).unwrap();
        assert!(flags.ai);
        assert!(!flags.blob);
    }
}
