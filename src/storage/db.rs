use std::path::Path;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::{
    config::Database,
    storage::{error::StorageError, schema},
};

pub type MillisSinceUnix = i64;

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &Database) -> Result<rusqlite::Connection, StorageError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config.path.as_deref().ok_or_else(|| {
            StorageError::Internal(anyhow!("database.path is required unless in_memory is set"))
        })?;
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}

pub fn to_millis(time: DateTime<Utc>) -> MillisSinceUnix {
    time.timestamp_millis()
}

pub fn from_millis(millis: MillisSinceUnix) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        StorageError::Internal(anyhow!(
            "failed to convert {millis} ms timestamp to datetime"
        ))
    })
}
