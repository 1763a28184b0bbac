pub mod catalog;
pub mod config;
pub mod daemon;
pub mod sync;
pub mod sync_ui;

use catalog_sync_config::{Config, PathManager};
use catalog_sync_core::{open_catalog_store, CatalogStore, SyncOrchestrator, SyncPublisher};
use catalog_sync_feed::HttpFeedClient;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration and paths resolved once per invocation
pub struct AppContext {
    pub paths: PathManager,
    pub config_file: PathBuf,
    pub config: Config,
}

impl AppContext {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let paths = PathManager::default();
        let config_file = config_override.unwrap_or_else(|| paths.config_file());
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

        Ok(Self {
            paths,
            config_file,
            config,
        })
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.config
            .logging
            .file
            .clone()
            .unwrap_or_else(|| self.paths.daemon_log_file())
    }

    pub async fn open_store(&self) -> Result<Arc<dyn CatalogStore>> {
        open_catalog_store(&self.config, &self.paths)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))
    }

    /// Orchestrator wired to the configured feed over HTTP
    pub fn orchestrator(&self, store: Arc<dyn CatalogStore>, publisher: SyncPublisher) -> Result<SyncOrchestrator> {
        self.config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
        let feed_url = self
            .config
            .feed_url()
            .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

        Ok(SyncOrchestrator::new(Arc::new(HttpFeedClient::new()), store, feed_url, publisher)
            .with_release_date_policy(self.config.feed.release_date_policy))
    }
}
