use async_trait::async_trait;
use catalog_sync_models::{Identity, MovieRecord};
use std::collections::BTreeMap;
use std::sync::RwLock;
use crate::error::StoreError;
use super::{CatalogStore, UpsertOutcome};

/// Process-local catalog, ordered by identity
#[derive(Default)]
pub struct MemoryCatalogStore {
    records: RwLock<BTreeMap<Identity, MovieRecord>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = MovieRecord>,
    {
        let records = records
            .into_iter()
            .map(|record| (record.identity(), record))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn upsert(&self, record: MovieRecord) -> Result<UpsertOutcome, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        match records.insert(record.identity(), record) {
            Some(_) => Ok(UpsertOutcome::Replaced),
            None => Ok(UpsertOutcome::Inserted),
        }
    }

    async fn delete(&self, identity: &Identity) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(records.remove(identity).is_some())
    }

    async fn list_all(&self) -> Result<Vec<MovieRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.values().cloned().collect())
    }
}
