use catalog_sync_feed::{BatchParseError, TransportError};
use catalog_sync_models::ValidationError;
use std::path::PathBuf;
use thiserror::Error;
use crate::sync::SyncState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("catalog lock poisoned")]
    Poisoned,
    #[error("catalog backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sync already in progress (state: {state})")]
    AlreadyRunning { state: SyncState },
}

/// Why an accepted sync cycle ended in `Failed`
#[derive(Debug, Error)]
pub enum SyncFailure {
    #[error("failed to fetch feed: {0}")]
    Transport(#[from] TransportError),
    #[error("feed payload rejected: {0}")]
    BatchParse(#[from] BatchParseError),
    #[error("failed to read merged catalog: {0}")]
    Store(#[from] StoreError),
    #[error("sync task ended before publishing a result")]
    Aborted,
}

/// Failure of a user-initiated catalog operation
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid movie: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
