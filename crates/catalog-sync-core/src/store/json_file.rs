use async_trait::async_trait;
use catalog_sync_models::{Identity, MovieRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use crate::error::StoreError;
use super::{CatalogStore, UpsertOutcome};

/// Catalog persisted as a JSON array on disk.
///
/// The whole catalog is kept in memory behind an async mutex and rewritten
/// atomically (temp file, then rename) on every mutation while the mutex is held.
/// If the write fails the in-memory state is rolled back, so memory and disk never
/// disagree about a record.
pub struct JsonCatalogStore {
    path: PathBuf,
    records: Mutex<BTreeMap<Identity, MovieRecord>>,
}

impl JsonCatalogStore {
    /// Load the catalog at `path`; a missing file is an empty catalog
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = load_records(&path).await?;
        info!(
            operation = "catalog_open",
            path = %path.display(),
            records = records.len(),
            "Opened catalog"
        );
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, records: &BTreeMap<Identity, MovieRecord>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
            }
        }

        let rows: Vec<&MovieRecord> = records.values().collect();
        let json = serde_json::to_string_pretty(&rows).map_err(StoreError::Serialize)?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await.map_err(io_error)?;
        tokio::fs::rename(&temp_path, &self.path).await.map_err(io_error)?;

        debug!("Catalog saved: {} ({} records)", self.path.display(), rows.len());
        Ok(())
    }
}

async fn load_records(path: &Path) -> Result<BTreeMap<Identity, MovieRecord>, StoreError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Catalog file {} does not exist, starting empty", path.display());
            return Ok(BTreeMap::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    // An unreadable catalog is never silently replaced with an empty one
    let rows: Vec<MovieRecord> = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;

    let row_count = rows.len();
    let records: BTreeMap<Identity, MovieRecord> = rows
        .into_iter()
        .map(|record| (record.identity(), record))
        .collect();
    if records.len() != row_count {
        warn!(
            "Catalog file {} had {} duplicate identities; keeping the last of each",
            path.display(),
            row_count - records.len()
        );
    }
    Ok(records)
}

#[async_trait]
impl CatalogStore for JsonCatalogStore {
    async fn upsert(&self, record: MovieRecord) -> Result<UpsertOutcome, StoreError> {
        let mut records = self.records.lock().await;
        let identity = record.identity();
        let previous = records.insert(identity.clone(), record);

        if let Err(e) = self.persist(&records).await {
            match previous {
                Some(previous) => records.insert(identity, previous),
                None => records.remove(&identity),
            };
            return Err(e);
        }

        Ok(match previous {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        })
    }

    async fn delete(&self, identity: &Identity) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let Some(removed) = records.remove(identity) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&records).await {
            records.insert(identity.clone(), removed);
            return Err(e);
        }
        Ok(true)
    }

    async fn list_all(&self) -> Result<Vec<MovieRecord>, StoreError> {
        let records = self.records.lock().await;
        Ok(records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_sync_models::{Genre, ParentalGuidance};

    fn create_movie(title: &str, release: &str, rating: f32) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            release: Identity::parse(title, release).unwrap().release,
            budget: Some(55_000_000.0),
            duration_minutes: 130,
            genre: Genre::Thriller,
            guidance: Some(ParentalGuidance::R),
            rating,
            watched: true,
            poster_url: "https://example.com/p.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonCatalogStore::open(dir.path().join("data").join("catalog.json")).await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mutations_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("catalog.json");

        let store = JsonCatalogStore::open(&path).await.unwrap();
        store.upsert(create_movie("Heat", "1995-12-15", 8.3)).await.unwrap();
        store.upsert(create_movie("Se7en", "1995-09-22", 8.6)).await.unwrap();
        assert_eq!(store.upsert(create_movie("Heat", "1995-12-15", 8.4)).await.unwrap(), UpsertOutcome::Replaced);
        assert!(store.delete(&Identity::parse("Se7en", "1995-09-22").unwrap()).await.unwrap());
        drop(store);

        let reopened = JsonCatalogStore::open(&path).await.unwrap();
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Heat");
        assert_eq!(all[0].rating, 8.4);
        assert_eq!(all[0].guidance, Some(ParentalGuidance::R));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = JsonCatalogStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
        // The file is left in place for inspection
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_duplicate_rows_collapse_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let rows = vec![create_movie("Heat", "1995-12-15", 1.0), create_movie("Heat", "1995-12-15", 8.3)];
        std::fs::write(&path, serde_json::to_string(&rows).unwrap()).unwrap();

        let store = JsonCatalogStore::open(&path).await.unwrap();
        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].rating, 8.3);
    }
}
