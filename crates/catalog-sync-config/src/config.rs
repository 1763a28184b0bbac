use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::paths::PathManager;

pub use catalog_sync_models::ReleaseDatePolicy;

pub const DEFAULT_FEED_URL: &str = "https://jsonkeeper.com/b/FLBCO";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default)]
    pub release_date_policy: ReleaseDatePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Catalog file; defaults to `<data_dir>/catalog.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json_logging")]
    pub json: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    6 * 60 * 60 // Every 6 hours
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json_logging() -> bool {
    use std::io::IsTerminal;
    !std::io::stdout().is_terminal()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            release_date_policy: ReleaseDatePolicy::default(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            run_on_startup: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json_logging(),
            file: None,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.feed_url()?;

        if self.scheduler.refresh_interval_secs == 0 {
            return Err(anyhow::anyhow!("refresh_interval_secs must be greater than 0"));
        }

        Ok(())
    }

    /// The feed location as an absolute http(s) URL
    pub fn feed_url(&self) -> anyhow::Result<url::Url> {
        let url = url::Url::parse(&self.feed.url)
            .map_err(|e| anyhow::anyhow!("Invalid feed url '{}': {}", self.feed.url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow::anyhow!("Feed url must use http or https, got '{}'", url.scheme()));
        }
        Ok(url)
    }

    /// Resolve where the catalog lives
    pub fn catalog_path(&self, paths: &PathManager) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| paths.catalog_file())
    }
}
