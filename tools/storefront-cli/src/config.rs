//! CLI configuration.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use storefront_commerce::Currency;
use storefront_data::services::DEFAULT_USER_ID;
use storefront_data::DEFAULT_BASE_URL;

use crate::logging::LogFormat;

/// File names searched for, in order, from the working directory upward.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Price and listing display.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Local persistence of cart and favorites.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            bail!("api.base_url must be an http(s) URL, got '{}'", self.api.base_url);
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be positive");
        }
        if Currency::from_code(&self.display.currency).is_none() {
            bail!("display.currency '{}' is not supported", self.display.currency);
        }
        if self.display.page_size == 0 {
            bail!("display.page_size must be positive");
        }
        Ok(())
    }
}

/// Backend connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Owner stamped on new favorites.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_id: default_user_id(),
        }
    }
}

/// Price and listing display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Locale for number formatting.
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Products per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_page_size() -> usize {
    storefront_commerce::search::PRODUCTS_PAGE_SIZE
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            locale: default_locale(),
            page_size: default_page_size(),
        }
    }
}

/// Local persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Whether cart and favorites are mirrored to disk.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for snapshots; defaults to the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

/// Log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `human` or `json`.
    #[serde(default)]
    pub format: LogFormat,

    /// Default level filter.
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
        }
    }
}

/// Generate a commented default config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront CLI configuration

[api]
base_url = "{base_url}"
timeout_secs = 10
user_id = "{user_id}"

[display]
currency = "USD"
locale = "en-US"
page_size = 12

[storage]
enabled = true
# dir = "/path/to/storefront-data"

[logging]
# human or json
format = "human"
level = "warn"
"#,
        base_url = DEFAULT_BASE_URL,
        user_id = DEFAULT_USER_ID,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: StorefrontConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: StorefrontConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://shop.example.com/api"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.api.user_id, "1");
        assert_eq!(config.display.page_size, 12);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storefront.json");
        let path = path.to_str().unwrap();

        let mut config = StorefrontConfig::default();
        config.display.currency = "EUR".to_string();
        config.save(path).unwrap();

        assert_eq!(StorefrontConfig::load(path).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StorefrontConfig::default();
        config.display.currency = "XYZ".to_string();
        assert!(config.validate().is_err());

        let mut config = StorefrontConfig::default();
        config.api.base_url = "localhost:3001".to_string();
        assert!(config.validate().is_err());
    }
}
