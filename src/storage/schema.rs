use rusqlite::Connection;

use crate::{domain::media::BinaryStore, storage::error::StorageError};

pub mod tables {
    pub const AUDIO_FILES: &str = "audio_files";
    pub const VIDEO_FILES: &str = "video_files";
    pub const IMAGES: &str = "images";
    pub const TEXT_ENTRIES: &str = "text_entries";

    pub const ALL_TABLES: &[&str] = &[AUDIO_FILES, VIDEO_FILES, IMAGES, TEXT_ENTRIES];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const MIME_TYPE: &str = "mime_type";
    pub const SIZE: &str = "size";
    pub const PAYLOAD: &str = "payload";
    pub const CHECKSUM: &str = "checksum";
    pub const UPLOAD_DATE: &str = "upload_date";
    pub const KEY: &str = "key";
    pub const VALUE: &str = "value";
}

pub use columns::*;
pub use tables::*;

pub fn table_for(store: BinaryStore) -> &'static str {
    match store {
        BinaryStore::AudioFiles => AUDIO_FILES,
        BinaryStore::VideoFiles => VIDEO_FILES,
        BinaryStore::Images => IMAGES,
    }
}

const V1_MEDIA_STORES: &str = r#"
CREATE TABLE IF NOT EXISTS audio_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    payload BLOB NOT NULL,
    checksum TEXT NOT NULL,
    upload_date INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS audio_files_name ON audio_files (name);

CREATE TABLE IF NOT EXISTS video_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    payload BLOB NOT NULL,
    checksum TEXT NOT NULL,
    upload_date INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS video_files_name ON video_files (name);
"#;

const V2_IMAGES: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    payload BLOB NOT NULL,
    checksum TEXT NOT NULL,
    upload_date INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS images_name ON images (name);
CREATE INDEX IF NOT EXISTS images_upload_date ON images (upload_date);
"#;

const V3_TEXT_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS text_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Additive migrations; entry `n` brings the schema to version `n + 1`.
pub const MIGRATIONS: &[&str] = &[V1_MEDIA_STORES, V2_IMAGES, V3_TEXT_ENTRIES];

pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

pub fn version(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Brings the schema up to [`SCHEMA_VERSION`]. Safe to call on every open.
pub fn init(conn: &Connection) -> Result<(), StorageError> {
    let found = version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(StorageError::VersionConflict {
            found,
            supported: SCHEMA_VERSION,
        });
    }

    let tx = conn.unchecked_transaction()?;
    for (idx, migration) in MIGRATIONS.iter().enumerate().skip(found as usize) {
        log::debug!("applying schema migration to version {}", idx + 1);
        tx.execute_batch(migration)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;
    Ok(())
}
