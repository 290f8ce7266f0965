//! Monitor Configuration - device cloud, telemetry, recommendation and storage settings
//!
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a missing config file yields a working (if credential-less) setup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GROWMONITOR_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "growmonitor.toml";

/// Environment overrides for device-cloud credentials.
pub const CLIENT_ID_ENV_VAR: &str = "GROWMONITOR_CLIENT_ID";
pub const ACCESS_TOKEN_ENV_VAR: &str = "GROWMONITOR_ACCESS_TOKEN";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$GROWMONITOR_CONFIG` env var
/// 2. `./growmonitor.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Device-cloud endpoint and credentials
    #[serde(default)]
    pub device_cloud: DeviceCloudConfig,

    /// Log retrieval and metric code settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Recommendation gate and generator settings
    #[serde(default)]
    pub recommendation: RecommendationConfig,

    /// Persistent store location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl MonitorConfig {
    /// Load configuration using the standard search order, then apply
    /// credential overrides from the environment.
    pub fn load() -> Self {
        let mut config = Self::load_from_search_path();
        config.apply_env_overrides();
        config
    }

    fn load_from_search_path() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./growmonitor.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Credentials from the environment win over the file so secrets can stay
    /// out of checked-in configs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var(CLIENT_ID_ENV_VAR) {
            self.device_cloud.client_id = id;
        }
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV_VAR) {
            self.device_cloud.access_token = token;
        }
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Validate ranges; warnings are logged, errors reject the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Path of the sled database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.storage.data_dir.join(defaults::DB_FILE_NAME)
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Device Cloud
// ============================================================================

/// Device-cloud endpoint and credentials.
///
/// Token issuance happens outside this crate; the token is sent as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCloudConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub access_token: String,

    /// Per-request HTTP timeout (seconds)
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_base_url() -> String {
    defaults::DEVICE_CLOUD_BASE_URL.to_string()
}
fn default_http_timeout_secs() -> u64 {
    defaults::DEVICE_CLOUD_HTTP_TIMEOUT_SECS
}

impl Default for DeviceCloudConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            client_id: String::new(),
            access_token: String::new(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl DeviceCloudConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.access_token.is_empty()
    }
}

// ============================================================================
// Telemetry
// ============================================================================

/// Log retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_temperature_code")]
    pub temperature_code: String,

    #[serde(default = "default_humidity_code")]
    pub humidity_code: String,

    /// Entries requested per page (upstream caps this at 100)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pages a single fetch may request before failing
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Overall deadline for one paginated fetch (seconds); unset = no deadline
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,

    /// Raw value divisors per metric code, e.g. `va_temperature = 10.0`
    #[serde(default = "default_divisors")]
    pub divisors: BTreeMap<String, f64>,
}

fn default_temperature_code() -> String {
    defaults::TEMPERATURE_CODE.to_string()
}
fn default_humidity_code() -> String {
    defaults::HUMIDITY_CODE.to_string()
}
fn default_page_size() -> u32 {
    defaults::PAGE_SIZE
}
fn default_max_pages() -> u32 {
    defaults::MAX_PAGES
}
fn default_divisors() -> BTreeMap<String, f64> {
    BTreeMap::from([(
        defaults::TEMPERATURE_CODE.to_string(),
        defaults::TEMPERATURE_DIVISOR,
    )])
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            temperature_code: default_temperature_code(),
            humidity_code: default_humidity_code(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            fetch_timeout_secs: None,
            divisors: default_divisors(),
        }
    }
}

impl TelemetryConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    /// Temperature and humidity codes in declaration order.
    pub fn climate_codes(&self) -> Vec<String> {
        vec![self.temperature_code.clone(), self.humidity_code.clone()]
    }
}

// ============================================================================
// Recommendation
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// Minimum hours between two recommendations for one user
    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: u32,

    /// Endpoint that turns a climate context into advice text
    #[serde(default)]
    pub generator_url: Option<String>,

    #[serde(default = "default_generator_timeout_secs")]
    pub generator_timeout_secs: u64,
}

fn default_cooldown_hours() -> u32 {
    defaults::COOLDOWN_HOURS
}
fn default_generator_timeout_secs() -> u64 {
    defaults::GENERATOR_TIMEOUT_SECS
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: default_cooldown_hours(),
            generator_url: None,
            generator_timeout_secs: default_generator_timeout_secs(),
        }
    }
}

impl RecommendationConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cooldown_hours))
    }

    pub fn generator_timeout(&self) -> Duration {
        Duration::from_secs(self.generator_timeout_secs)
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(defaults::DATA_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = MonitorConfig::default();
        assert_eq!(config.telemetry.page_size, 100);
        assert_eq!(config.telemetry.max_pages, 500);
        assert_eq!(config.recommendation.cooldown_hours, 24);
        assert_eq!(
            config.telemetry.divisors.get("va_temperature").copied(),
            Some(10.0)
        );
        assert!(config.telemetry.fetch_timeout().is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [telemetry]
            page_size = 50
            fetch_timeout_secs = 20
        "#,
        )
        .unwrap();
        assert_eq!(config.telemetry.page_size, 50);
        assert_eq!(config.telemetry.fetch_timeout(), Some(Duration::from_secs(20)));
        assert_eq!(config.telemetry.humidity_code, "va_humidity");
        assert_eq!(config.device_cloud.base_url, defaults::DEVICE_CLOUD_BASE_URL);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = MonitorConfig::from_toml_str(
            r#"
            [telemetry]
            page_size = 0
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = MonitorConfig::default();
        config.recommendation.generator_url = Some("http://localhost:9000/advice".into());
        let text = config.to_toml().unwrap();
        let parsed = MonitorConfig::from_toml_str(&text).unwrap();
        assert_eq!(
            parsed.recommendation.generator_url.as_deref(),
            Some("http://localhost:9000/advice")
        );
        assert_eq!(parsed.telemetry.divisors, config.telemetry.divisors);
    }

    #[test]
    fn test_database_path_joins_data_dir() {
        let config = MonitorConfig::default();
        assert!(config.database_path().ends_with("growmonitor.db"));
    }
}
