pub mod error;
pub mod reconcile;
pub mod service;
pub mod store;
pub mod sync;

pub use error::{ServiceError, StoreError, SyncError, SyncFailure};
pub use reconcile::{ReconcileReport, Reconciler, UpsertFailure};
pub use service::CatalogService;
pub use store::{open_catalog_store, CatalogStore, JsonCatalogStore, MemoryCatalogStore, UpsertOutcome};
pub use sync::{CycleHandle, CycleSummary, SyncOrchestrator, SyncOutcome, SyncPublisher, SyncReport, SyncState};
