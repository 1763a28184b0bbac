use catalog_sync_models::{Identity, MovieRecord};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::error::StoreError;
use crate::store::{CatalogStore, UpsertOutcome};

/// A record that could not be written; the rest of the batch still merges
#[derive(Debug, Clone, Serialize)]
pub struct UpsertFailure {
    pub identity: Identity,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Full catalog after the merge, ordered by identity
    pub merged: Vec<MovieRecord>,
    pub inserted: usize,
    pub replaced: usize,
    pub failures: Vec<UpsertFailure>,
}

/// Merges a batch of parsed records into the catalog by identity
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<dyn CatalogStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Upsert every record, then read the whole catalog back.
    ///
    /// Records sharing an identity inside one batch collapse to the last one.
    /// Individual upsert failures are collected, not propagated; only the final
    /// `list_all` can fail the call.
    pub async fn reconcile(&self, records: Vec<MovieRecord>) -> Result<ReconcileReport, StoreError> {
        let batch_size = records.len();
        let mut report = ReconcileReport::default();

        for record in records {
            let identity = record.identity();
            match self.store.upsert(record).await {
                Ok(UpsertOutcome::Inserted) => {
                    debug!("Inserted {}", identity);
                    report.inserted += 1;
                }
                Ok(UpsertOutcome::Replaced) => {
                    debug!("Replaced {}", identity);
                    report.replaced += 1;
                }
                Err(e) => {
                    warn!(
                        operation = "upsert",
                        status = "error",
                        identity = %identity,
                        error = %e,
                        "Failed to store movie, continuing with the rest of the batch"
                    );
                    report.failures.push(UpsertFailure {
                        identity,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.merged = self.store.list_all().await?;

        info!(
            operation = "reconcile",
            batch = batch_size,
            inserted = report.inserted,
            replaced = report.replaced,
            failed = report.failures.len(),
            catalog = report.merged.len(),
            "Merged feed into catalog"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalogStore;
    use async_trait::async_trait;
    use catalog_sync_models::{Genre, ParentalGuidance};

    fn create_movie(title: &str, release: &str, rating: f32) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            release: Identity::parse(title, release).unwrap().release,
            budget: Some(1_000_000.0),
            duration_minutes: 100,
            genre: Genre::Drama,
            guidance: Some(ParentalGuidance::PG),
            rating,
            watched: false,
            poster_url: "https://example.com/p.jpg".to_string(),
        }
    }

    /// Refuses to store one title, delegates everything else
    struct RefusingStore {
        inner: MemoryCatalogStore,
        refused_title: &'static str,
    }

    #[async_trait]
    impl CatalogStore for RefusingStore {
        async fn upsert(&self, record: MovieRecord) -> Result<UpsertOutcome, StoreError> {
            if record.title == self.refused_title {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.inner.upsert(record).await
        }

        async fn delete(&self, identity: &Identity) -> Result<bool, StoreError> {
            self.inner.delete(identity).await
        }

        async fn list_all(&self) -> Result<Vec<MovieRecord>, StoreError> {
            self.inner.list_all().await
        }
    }

    #[tokio::test]
    async fn test_batch_duplicates_keep_last() {
        let reconciler = Reconciler::new(Arc::new(MemoryCatalogStore::new()));
        let report = reconciler
            .reconcile(vec![
                create_movie("Arrival", "2016-11-11", 7.0),
                create_movie("Arrival", "2016-11-11", 7.9),
            ])
            .await
            .unwrap();

        assert_eq!(report.merged.len(), 1);
        assert_eq!(report.merged[0].rating, 7.9);
        assert_eq!(report.inserted, 1);
        assert_eq!(report.replaced, 1);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let reconciler = Reconciler::new(Arc::new(MemoryCatalogStore::new()));
        let batch = vec![
            create_movie("Arrival", "2016-11-11", 7.9),
            create_movie("Sicario", "2015-10-02", 7.6),
        ];

        let first = reconciler.reconcile(batch.clone()).await.unwrap();
        let second = reconciler.reconcile(batch).await.unwrap();

        assert_eq!(first.merged, second.merged);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.replaced, 2);
    }

    #[tokio::test]
    async fn test_same_title_different_release_are_distinct() {
        let reconciler = Reconciler::new(Arc::new(MemoryCatalogStore::new()));
        let report = reconciler
            .reconcile(vec![
                create_movie("Dune", "1984-12-14", 6.3),
                create_movie("Dune", "2021-10-22", 8.0),
            ])
            .await
            .unwrap();
        assert_eq!(report.merged.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_failure_does_not_abort_batch() {
        let store = Arc::new(RefusingStore {
            inner: MemoryCatalogStore::new(),
            refused_title: "Enemy",
        });
        let reconciler = Reconciler::new(store);

        let report = reconciler
            .reconcile(vec![
                create_movie("Prisoners", "2013-09-20", 8.1),
                create_movie("Enemy", "2014-03-14", 6.9),
                create_movie("Incendies", "2010-09-17", 8.3),
            ])
            .await
            .unwrap();

        let titles: Vec<&str> = report.merged.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Incendies", "Prisoners"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].identity, Identity::parse("Enemy", "2014-03-14").unwrap());
        assert!(report.failures[0].error.contains("disk full"));
    }
}
