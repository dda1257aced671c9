use thiserror::Error;
use uuid::Uuid;

/// Failure of a store operation that the caller must handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no task with id {0}")]
    TaskNotFound(Uuid),
    #[error("no goal with id {0}")]
    GoalNotFound(Uuid),
}

/// Failure of the underlying key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("not saving `{key}`: the stored copy could not be read or backed up")]
    Protected { key: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
