use rusqlite::ErrorCode;
use thiserror::Error;

use crate::domain::media::{BinaryStore, RecordId};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("storage is unavailable: {0}")]
    Unavailable(#[source] rusqlite::Error),

    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(#[source] rusqlite::Error),

    #[error("storage is blocked by another connection: {0}")]
    Blocked(#[source] rusqlite::Error),

    #[error("database schema version {found} is newer than supported version {supported}")]
    VersionConflict { found: i64, supported: i64 },

    #[error("store {store} does not accept this kind of key")]
    KeyPolicy { store: BinaryStore },

    #[error("record {id} already exists in {store}")]
    DuplicateKey { store: BinaryStore, id: String },

    #[error("record {id} in {store} failed its checksum")]
    Corrupted { store: BinaryStore, id: RecordId },

    #[error("malformed text entry '{key}': {source}")]
    MalformedEntry {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DiskFull) => StorageError::QuotaExceeded(err),
            Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
                StorageError::Blocked(err)
            }
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::ReadOnly) => {
                StorageError::Unavailable(err)
            }
            _ => StorageError::Database(err),
        }
    }
}
