pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use catalog_sync_config::{Config, PathManager};
use catalog_sync_models::{Identity, MovieRecord};
use serde::Serialize;
use std::sync::Arc;
use crate::error::StoreError;

pub use json_file::JsonCatalogStore;
pub use memory::MemoryCatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Keyed persistent storage for catalog entries.
///
/// Implementations keep at most one record per `Identity` (`upsert` replaces on
/// conflict) and make `upsert`, `delete` and `list_all` linearizable with respect to
/// each other, so a sync merge and user edits may interleave without tearing.
/// `list_all` returns records ordered by identity.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert(&self, record: MovieRecord) -> Result<UpsertOutcome, StoreError>;

    /// Returns whether a record was removed
    async fn delete(&self, identity: &Identity) -> Result<bool, StoreError>;

    async fn list_all(&self) -> Result<Vec<MovieRecord>, StoreError>;
}

/// Open the file-backed catalog configured for this installation
pub async fn open_catalog_store(config: &Config, paths: &PathManager) -> anyhow::Result<Arc<dyn CatalogStore>> {
    let path = config.catalog_path(paths);
    let store = JsonCatalogStore::open(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open catalog at {}: {}", path.display(), e))?;
    Ok(Arc::new(store))
}
