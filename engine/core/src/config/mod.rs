//! Engine configuration
//!
//! Centralized configuration loading for the engine, from a TOML file at
//! `~/.config/docdesk/engine.toml`.
//!
//! # Precedence
//!
//! Values are applied in the following order (last wins):
//! 1. Default values
//! 2. TOML configuration file
//! 3. Environment variables
//! 4. Programmatic overrides ([`ConfigOverrides`])
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 120
//! connect_timeout_ms = 5000
//!
//! [search]
//! limit = 5
//!
//! [upload]
//! max_bytes = 10485760
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default service address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default number of search results requested
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Largest search limit the service accepts
pub const MAX_SEARCH_LIMIT: u32 = 20;

/// Default upload size cap (the service rejects anything larger)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// =============================================================================
// Error Types
// =============================================================================

/// Why configuration could not be produced
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read
    #[error("cannot read {path}: {source}")]
    ReadError {
        /// File that failed
        path: PathBuf,
        /// I/O failure
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema
    #[error("invalid engine.toml: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Highest-precedence layer that set any value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from a programmatic override
    Override,
    /// A `DOCDESK_*` environment variable
    Env,
    /// The TOML file
    File,
    /// Built-in defaults only
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// API section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// Service root URL
    pub base_url: Option<String>,

    /// Whole-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// TCP connect timeout, milliseconds
    pub connect_timeout_ms: Option<u64>,
}

/// Search section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchToml {
    /// Number of results requested per search
    pub limit: Option<u32>,
}

/// Upload section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadToml {
    /// Largest file accepted for upload, in bytes
    pub max_bytes: Option<u64>,
}

/// Shape of `engine.toml`; every key optional
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// API configuration section
    pub api: ApiToml,

    /// Search configuration section
    pub search: SearchToml,

    /// Upload configuration section
    pub upload: UploadToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Connection settings for the assistant service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiSettings {
    /// Service root URL
    pub base_url: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Centralized configuration for the engine
///
/// Use [`load_config`] to load it with proper priority handling.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Service connection settings
    pub api: ApiSettings,

    /// Number of results requested per search
    pub search_limit: u32,

    /// Largest file accepted for upload, in bytes
    pub max_upload_bytes: u64,

    /// File the values were read from, when one existed
    pub config_file_path: Option<PathBuf>,

    /// Layer that last set a value
    source: ConfigSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl EngineConfig {
    /// Built-in defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Which layer last set a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values the service would reject anyway
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.search_limit) {
            return Err(ConfigError::ValidationError(format!(
                "search.limit must be between 1 and {MAX_SEARCH_LIMIT}, got {}",
                self.search_limit
            )));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "upload.max_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Where `engine.toml` is looked for
///
/// Returns `$XDG_CONFIG_HOME/docdesk/engine.toml` or
/// `~/.config/docdesk/engine.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("docdesk").join("engine.toml"))
}

/// Load configuration from the default path plus the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting configuration is invalid. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path plus the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the resulting configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

/// Loading with an injectable environment lookup
fn load_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: EngineToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Engine config loaded"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "No engine config file, keeping defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Copy every key present in the file
fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) {
    if let Some(ref url) = toml.api.base_url {
        config.api.base_url.clone_from(url);
    }
    if let Some(secs) = toml.api.request_timeout_secs {
        config.api.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = toml.api.connect_timeout_ms {
        config.api.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(limit) = toml.search.limit {
        config.search_limit = limit;
    }
    if let Some(max) = toml.upload.max_bytes {
        config.max_upload_bytes = max;
    }
}

/// Layer `DOCDESK_*` variables; unparsable numbers are ignored
fn apply_env_config(config: &mut EngineConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(url) = env("DOCDESK_API_URL") {
        config.api.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("DOCDESK_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.api.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(timeout) = env("DOCDESK_CONNECT_TIMEOUT") {
        if let Ok(ms) = timeout.parse::<u64>() {
            config.api.connect_timeout = Duration::from_millis(ms);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(limit) = env("DOCDESK_SEARCH_LIMIT") {
        if let Ok(n) = limit.parse::<u32>() {
            config.search_limit = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(max) = env("DOCDESK_MAX_UPLOAD_BYTES") {
        if let Ok(n) = max.parse::<u64>() {
            config.max_upload_bytes = n;
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// Override Support
// =============================================================================

/// Builder for applying programmatic overrides to configuration
///
/// Use this after [`load_config`], e.g. to point an embedding application at
/// a different service.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Request timeout override
    pub request_timeout: Option<Duration>,

    /// Search limit override
    pub search_limit: Option<u32>,
}

impl ConfigOverrides {
    /// No overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set search limit override
    #[must_use]
    pub fn with_search_limit(mut self, limit: u32) -> Self {
        self.search_limit = Some(limit);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the overridden
    /// configuration is invalid; `config` is left modified either way.
    pub fn apply(&self, config: &mut EngineConfig) -> Result<(), ConfigError> {
        if self.base_url.is_some() || self.request_timeout.is_some() || self.search_limit.is_some()
        {
            config.source = ConfigSource::Override;
        }

        if let Some(ref url) = self.base_url {
            config.api.base_url.clone_from(url);
        }
        if let Some(timeout) = self.request_timeout {
            config.api.request_timeout = timeout;
        }
        if let Some(limit) = self.search_limit {
            config.search_limit = limit;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout, Duration::from_secs(120));
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("docdesk"));
            assert!(p.to_string_lossy().ends_with("engine.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[api]
base_url = "http://assistant.internal:9000"
request_timeout_secs = 30
connect_timeout_ms = 750

[search]
limit = 10

[upload]
max_bytes = 2048
"#,
        );

        let config = load_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.api.base_url, "http://assistant.internal:9000");
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.api.connect_timeout, Duration::from_millis(750));
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.max_upload_bytes, 2048);
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_toml("[search]\nlimit = 3\n");

        let config = load_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.search_limit, 3);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = PathBuf::from("/nonexistent/docdesk/engine.toml");
        let config = load_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let file = write_toml("[api\nbase_url = ");
        let result = load_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_out_of_range_limit_rejected() {
        let file = write_toml("[search]\nlimit = 50\n");
        let result = load_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml("[api]\nbase_url = \"http://from-file:8000\"\n");
        let env: HashMap<&str, &str> = [
            ("DOCDESK_API_URL", "http://from-env:8000"),
            ("DOCDESK_SEARCH_LIMIT", "7"),
            ("DOCDESK_REQUEST_TIMEOUT", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = load_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(ToString::to_string)
        })
        .unwrap();

        assert_eq!(config.api.base_url, "http://from-env:8000");
        assert_eq!(config.search_limit, 7);
        // Unparseable values are ignored
        assert_eq!(config.api.request_timeout, Duration::from_secs(120));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_overrides_apply_last() {
        let mut config = EngineConfig::default();
        ConfigOverrides::new()
            .with_base_url("http://override:1234")
            .with_search_limit(2)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.api.base_url, "http://override:1234");
        assert_eq!(config.search_limit, 2);
        assert_eq!(config.source(), ConfigSource::Override);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = EngineConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut config = EngineConfig::default();
        let result = ConfigOverrides::new()
            .with_search_limit(0)
            .apply(&mut config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
