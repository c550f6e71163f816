use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const PROVIDER_KEY_ENV: &str = "TOMORROW_API_KEY";
const GEOCODING_KEY_ENV: &str = "GOOGLE_GEOCODING_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather timelines provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Address and IP geocoding
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Favorites storage
    #[serde(default)]
    pub favorites: FavoritesConfig,

    /// Aggregation limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Client view settings
    #[serde(default)]
    pub view: ViewConfig,
}

/// Unit system requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    pub fn as_str(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the timelines API
    #[serde(default = "default_provider_url")]
    pub base_url: String,

    /// API key (falls back to TOMORROW_API_KEY at load time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    /// Request timeout in seconds. Requests are attempted once.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How many days ahead to request
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

fn default_provider_url() -> String {
    "https://api.tomorrow.io/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_forecast_days() -> u32 {
    5
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            api_key: None,
            units: Units::default(),
            timeout_secs: default_timeout_secs(),
            forecast_days: default_forecast_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    /// Endpoint used for auto-detect when no coordinates are supplied
    #[serde(default = "default_ip_locate_url")]
    pub ip_locate_url: String,

    /// API key (falls back to GOOGLE_GEOCODING_API_KEY at load time)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_geocode_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_ip_locate_url() -> String {
    "https://ipapi.co/json/".to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocode_url(),
            ip_locate_url: default_ip_locate_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
    /// SQLite database holding saved locations
    pub db_path: PathBuf,
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            db_path: default_config_dir().join("favorites.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Daily intervals kept per forecast
    #[serde(default = "default_max_daily")]
    pub max_daily: usize,

    /// Hourly intervals kept per forecast
    #[serde(default = "default_max_hourly")]
    pub max_hourly: usize,
}

fn default_max_daily() -> usize {
    15
}

fn default_max_hourly() -> usize {
    120
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_daily: default_max_daily(),
            max_hourly: default_max_hourly(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// How long to wait for the map widget before failing
    #[serde(default = "default_map_ready_timeout_ms")]
    pub map_ready_timeout_ms: u64,
}

fn default_map_ready_timeout_ms() -> u64 {
    5000
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            map_ready_timeout_ms: default_map_ready_timeout_ms(),
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            provider: ProviderConfig::default(),
            geocoding: GeocodingConfig::default(),
            favorites: FavoritesConfig::default(),
            pipeline: PipelineConfig::default(),
            view: ViewConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, creating a default file if missing.
    ///
    /// API keys missing from the file are taken from the environment after
    /// loading and are never written back.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        config.apply_env_keys();
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns `ConfigError::Invalid` if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    fn apply_env_keys(&mut self) {
        if self.provider.api_key.is_none() {
            self.provider.api_key = std::env::var(PROVIDER_KEY_ENV).ok();
        }
        if self.geocoding.api_key.is_none() {
            self.geocoding.api_key = std::env::var(GEOCODING_KEY_ENV).ok();
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.provider.base_url, "provider.base_url", &mut result);
        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        self.validate_url(
            &self.geocoding.ip_locate_url,
            "geocoding.ip_locate_url",
            &mut result,
        );

        if self.provider.timeout_secs == 0 {
            result.add_error("provider.timeout_secs", "Timeout must be greater than 0");
        } else if self.provider.timeout_secs > 60 {
            result.add_warning(
                "provider.timeout_secs",
                "Timeout over 60 seconds; failures will be slow to surface",
            );
        }

        if self.provider.forecast_days == 0 {
            result.add_error("provider.forecast_days", "Must request at least one day");
        }

        if self.pipeline.max_daily == 0 {
            result.add_error("pipeline.max_daily", "Must keep at least one day");
        }

        if self.view.map_ready_timeout_ms == 0 {
            result.add_error("view.map_ready_timeout_ms", "Timeout must be greater than 0");
        }

        if is_blank(&self.provider.api_key) {
            result.add_warning(
                "provider.api_key",
                "Weather API key not configured - forecasts will fail",
            );
        }

        if is_blank(&self.geocoding.api_key) {
            result.add_warning(
                "geocoding.api_key",
                "Geocoding API key not configured - address search will fail",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, contents)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("platform config directory".to_string()))?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_provider_url() {
        let mut config = Config::default();
        config.provider.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "provider.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.geocoding.base_url = "ftp://maps.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = Config::default();
        config.provider.timeout_secs = 0;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "provider.timeout_secs"));
    }

    #[test]
    fn test_missing_api_key_is_warning() {
        let mut config = Config::default();
        config.provider.api_key = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "provider.api_key"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.pipeline.max_daily = 7;
        config.provider.units = Units::Metric;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.pipeline.max_daily, 7);
        assert_eq!(loaded.provider.units, Units::Metric);
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.pipeline.max_hourly, 120);
    }

    #[test]
    fn test_env_api_key_is_not_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::env::set_var(PROVIDER_KEY_ENV, "sk-env-only-key");

        let config = Config::load_from(&path).unwrap();
        std::env::remove_var(PROVIDER_KEY_ENV);

        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env-only-key"));
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(!on_disk.contains("sk-env-only-key"));
        assert!(!on_disk.contains("api_key"));
    }

    #[test]
    fn test_file_api_key_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.geocoding.api_key = Some("from-file".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.geocoding.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "provider = [not toml").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
