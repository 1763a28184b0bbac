use catalog_sync_models::{Identity, MovieDraft, MovieRecord};
use std::sync::Arc;
use tracing::info;
use crate::error::{ServiceError, StoreError};
use crate::store::{CatalogStore, UpsertOutcome};

/// User-initiated catalog edits.
///
/// Shares the store with the sync orchestrator; edits may interleave with a
/// running merge at record granularity. A later sync overwrites any edited record
/// whose identity is also in the feed.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Validate a form draft and store the result
    pub async fn save(&self, draft: &MovieDraft) -> Result<(MovieRecord, UpsertOutcome), ServiceError> {
        let record = draft.validate()?;
        let outcome = self.save_record(record.clone()).await?;
        Ok((record, outcome))
    }

    pub async fn save_record(&self, record: MovieRecord) -> Result<UpsertOutcome, StoreError> {
        let identity = record.identity();
        let outcome = self.store.upsert(record).await?;
        info!(operation = "save", identity = %identity, outcome = ?outcome, "Saved movie");
        Ok(outcome)
    }

    pub async fn delete(&self, identity: &Identity) -> Result<bool, StoreError> {
        let removed = self.store.delete(identity).await?;
        info!(operation = "delete", identity = %identity, removed, "Delete requested");
        Ok(removed)
    }

    pub async fn list(&self) -> Result<Vec<MovieRecord>, StoreError> {
        self.store.list_all().await
    }

    pub async fn find(&self, identity: &Identity) -> Result<Option<MovieRecord>, StoreError> {
        Ok(self
            .store
            .list_all()
            .await?
            .into_iter()
            .find(|record| record.matches(identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalogStore;
    use catalog_sync_models::{FormField, Genre, ParentalGuidance};

    fn draft(title: &str, release: &str) -> MovieDraft {
        MovieDraft {
            title: title.to_string(),
            budget: "2500000".to_string(),
            duration_minutes: 101,
            release: release.to_string(),
            poster: "https://example.com/poster.png".to_string(),
            genre: Genre::Horror,
            guidance: Some(ParentalGuidance::R),
            rating: 7.1,
            watched: false,
        }
    }

    #[tokio::test]
    async fn test_save_then_edit_same_identity() {
        let service = CatalogService::new(Arc::new(MemoryCatalogStore::new()));

        let (record, outcome) = service.save(&draft("The Witch", "2016-02-19")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(record.budget, Some(2_500_000.0));

        let mut edited = draft("The Witch", "2016-02-19");
        edited.watched = true;
        let (_, outcome) = service.save(&edited).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Replaced);

        let found = service
            .find(&Identity::parse("The Witch", "2016-02-19").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(found.watched);
    }

    #[tokio::test]
    async fn test_renaming_creates_new_entity() {
        let service = CatalogService::new(Arc::new(MemoryCatalogStore::new()));
        service.save(&draft("The Witch", "2016-02-19")).await.unwrap();
        service.save(&draft("The VVitch", "2016-02-19")).await.unwrap();

        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_stored() {
        let service = CatalogService::new(Arc::new(MemoryCatalogStore::new()));

        let result = service.save(&draft("", "2016-02-19")).await;
        match result {
            Err(ServiceError::Validation(e)) => assert_eq!(e.field, FormField::Title),
            other => panic!("expected validation error, got {:?}", other.map(|(r, _)| r)),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = CatalogService::new(Arc::new(MemoryCatalogStore::new()));
        service.save(&draft("Hereditary", "2018-06-08")).await.unwrap();
        let identity = Identity::parse("Hereditary", "2018-06-08").unwrap();

        assert!(service.delete(&identity).await.unwrap());
        assert!(!service.delete(&identity).await.unwrap());
        assert!(service.find(&identity).await.unwrap().is_none());
    }
}
