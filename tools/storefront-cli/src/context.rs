//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use storefront_cache::{FileBackend, Storage};
use storefront_data::{ApiGateway, FetchClient, ReqwestTransport};
use storefront_store::Storefront;
use tracing::debug;

use crate::config::{StorefrontConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: StorefrontConfig,
    /// Where the config was loaded from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, api_url: Option<String>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = match config_path {
            Some(path) => (StorefrontConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (StorefrontConfig::default(), None),
            },
        };

        if let Some(url) = api_url {
            config.api.base_url = url;
        }
        config.validate()?;

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build the controller, restoring any persisted cart and favorites.
    pub fn storefront(&self) -> Result<Storefront> {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(self.config.api.timeout_secs))
            .context("Failed to build HTTP client")?;
        let client = FetchClient::with_transport(transport).with_base_url(&self.config.api.base_url);
        let api = ApiGateway::new(client).with_user_id(self.config.api.user_id.as_str());
        debug!(base_url = %self.config.api.base_url, user_id = %self.config.api.user_id, "storefront client ready");

        let mut storefront = Storefront::new(api);
        if self.config.storage.enabled {
            let dir = self.storage_dir();
            let backend = FileBackend::open(&dir)
                .with_context(|| format!("Failed to open storage at {}", dir.display()))?;
            storefront = storefront.with_storage(Storage::new(backend));
            if storefront.restore() {
                self.output.debug(&format!("Restored local state from {}", dir.display()));
            }
        }
        Ok(storefront)
    }

    /// Directory for persisted snapshots.
    pub fn storage_dir(&self) -> PathBuf {
        match &self.config.storage.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.cwd.join(dir),
            None => dirs_path().join("storefront"),
        }
    }

    /// Format an amount in the configured currency and locale.
    pub fn price(&self, amount: f64) -> String {
        storefront_commerce::format_currency(amount, &self.config.display.currency, &self.config.display.locale)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<(StorefrontConfig, PathBuf)> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                if let Ok(config) = StorefrontConfig::load(config_path.to_str()?) {
                    return Some((config, config_path));
                }
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Get the platform-specific data directory.
fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            root.path().join(".storefront.toml"),
            "[display]\ncurrency = \"GBP\"\n",
        )
        .unwrap();

        let (config, path) = find_config(&nested).unwrap();
        assert_eq!(config.display.currency, "GBP");
        assert!(path.ends_with(".storefront.toml"));
    }

    #[test]
    fn test_find_config_prefers_first_name() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("storefront.toml"), "[display]\nlocale = \"de-DE\"\n").unwrap();
        std::fs::write(root.path().join("storefront.json"), r#"{"display": {"locale": "fr-FR"}}"#).unwrap();

        let (config, _) = find_config(root.path()).unwrap();
        assert_eq!(config.display.locale, "de-DE");
    }
}
