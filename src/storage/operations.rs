use rusqlite::{ErrorCode, OptionalExtension, Row, params, types::Value};

use crate::{
    config,
    domain::{
        hash::ContentHash,
        media::{BinaryStore, KeyPolicy, MediaRecord, NewRecord, RecordId},
    },
    storage::{
        db::{self, MillisSinceUnix},
        error::StorageError,
        schema::{self, columns::*, table_for},
    },
};

/// Main structure that implements all storage logic
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

/// A row as read from a binary store, before its checksum is verified.
struct RawRecord {
    id: RecordId,
    name: String,
    mime_type: String,
    size: i64,
    payload: Vec<u8>,
    checksum: String,
    upload_date: MillisSinceUnix,
}

const RECORD_COLUMNS: &str = "id, name, mime_type, size, payload, checksum, upload_date";

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::new(&config::Database {
            in_memory: true,
            path: None,
        })
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    pub fn schema_version(&self) -> Result<i64, StorageError> {
        Ok(schema::version(&self.db)?)
    }

    /// Stores a new record and returns its id.
    ///
    /// Auto-increment stores assign the id themselves and refuse one from the
    /// caller; `images` requires the caller's id and never overwrites.
    pub fn put(&mut self, store: BinaryStore, record: NewRecord) -> Result<RecordId, StorageError> {
        let table = table_for(store);
        let checksum = ContentHash::from_bytes(&record.payload).to_hex();
        let size = record.payload.len() as i64;
        let uploaded = db::to_millis(record.uploaded_at);

        let id = match (store.key_policy(), record.id) {
            (KeyPolicy::AutoIncrement, None) => {
                self.db.execute(
                    &format!(
                        "INSERT INTO {table} ({NAME}, {MIME_TYPE}, {SIZE}, {PAYLOAD}, {CHECKSUM}, {UPLOAD_DATE})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                    ),
                    params![record.name, record.mime_type, size, record.payload, checksum, uploaded],
                )?;
                RecordId::Seq(self.db.last_insert_rowid())
            }
            (KeyPolicy::CallerAssigned, Some(key)) => {
                let inserted = self.db.execute(
                    &format!(
                        "INSERT INTO {table} ({ID}, {NAME}, {MIME_TYPE}, {SIZE}, {PAYLOAD}, {CHECKSUM}, {UPLOAD_DATE})
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    params![key, record.name, record.mime_type, size, record.payload, checksum, uploaded],
                );
                match inserted {
                    Ok(_) => RecordId::Key(key),
                    Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                        return Err(StorageError::DuplicateKey { store, id: key });
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            _ => return Err(StorageError::KeyPolicy { store }),
        };

        log::info!("{store}: saved {} ({} bytes) as {id}", record.name, size);
        Ok(id)
    }

    /// All records of a store in key order.
    pub fn get_all(&self, store: BinaryStore) -> Result<Vec<MediaRecord>, StorageError> {
        let table = table_for(store);
        let mut stmt = self
            .db
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM {table} ORDER BY {ID}"))?;
        let raw = stmt
            .query_map([], |row| Self::read_row(store, row))?
            .collect::<Result<Vec<_>, _>>()?;

        raw.into_iter().map(|r| Self::verify(store, r)).collect()
    }

    pub fn get(&self, store: BinaryStore, id: &RecordId) -> Result<Option<MediaRecord>, StorageError> {
        let table = table_for(store);
        let key = Self::key_param(store, id)?;
        let raw = self
            .db
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM {table} WHERE {ID} = ?1"),
                params![key],
                |row| Self::read_row(store, row),
            )
            .optional()?;

        raw.map(|r| Self::verify(store, r)).transpose()
    }

    /// Removes a record. Deleting an id that is not there is not an error.
    pub fn delete(&mut self, store: BinaryStore, id: &RecordId) -> Result<(), StorageError> {
        let table = table_for(store);
        let key = Self::key_param(store, id)?;
        let removed = self
            .db
            .execute(&format!("DELETE FROM {table} WHERE {ID} = ?1"), params![key])?;

        if removed == 0 {
            log::debug!("{store}: delete of missing record {id}");
        } else {
            log::info!("{store}: deleted {id}");
        }
        Ok(())
    }

    pub fn count(&self, store: BinaryStore) -> Result<usize, StorageError> {
        let table = table_for(store);
        let n: i64 = self
            .db
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn key_param(store: BinaryStore, id: &RecordId) -> Result<Value, StorageError> {
        match (store.key_policy(), id) {
            (KeyPolicy::AutoIncrement, RecordId::Seq(n)) => Ok(Value::Integer(*n)),
            (KeyPolicy::CallerAssigned, RecordId::Key(k)) => Ok(Value::Text(k.clone())),
            _ => Err(StorageError::KeyPolicy { store }),
        }
    }

    fn read_row(store: BinaryStore, row: &Row<'_>) -> rusqlite::Result<RawRecord> {
        let id = match store.key_policy() {
            KeyPolicy::AutoIncrement => RecordId::Seq(row.get(0)?),
            KeyPolicy::CallerAssigned => RecordId::Key(row.get(0)?),
        };
        Ok(RawRecord {
            id,
            name: row.get(1)?,
            mime_type: row.get(2)?,
            size: row.get(3)?,
            payload: row.get(4)?,
            checksum: row.get(5)?,
            upload_date: row.get(6)?,
        })
    }

    fn verify(store: BinaryStore, raw: RawRecord) -> Result<MediaRecord, StorageError> {
        let checksum = match ContentHash::from_hex(&raw.checksum) {
            Ok(hash) if hash.matches(&raw.payload) => hash,
            _ => {
                log::error!("{store}: checksum mismatch for record {}", raw.id);
                return Err(StorageError::Corrupted { store, id: raw.id });
            }
        };

        Ok(MediaRecord {
            id: raw.id,
            name: raw.name,
            mime_type: raw.mime_type,
            size: raw.size as u64,
            payload: raw.payload,
            checksum,
            uploaded_at: db::from_millis(raw.upload_date)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rusqlite::params;

    use crate::{
        domain::media::{BinaryStore, NewRecord, RecordId},
        storage::{error::StorageError, operations::Storage, schema::*},
    };

    fn record(name: &str, mime: &str, payload: &[u8]) -> NewRecord {
        NewRecord {
            id: None,
            name: name.to_string(),
            mime_type: mime.to_string(),
            payload: payload.to_vec(),
            uploaded_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_put_assigns_sequential_ids() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;

        let a = storage.put(BinaryStore::AudioFiles, record("a.mp3", "audio/mpeg", b"aa"))?;
        let b = storage.put(BinaryStore::AudioFiles, record("b.mp3", "audio/mpeg", b"bb"))?;
        let v = storage.put(BinaryStore::VideoFiles, record("v.mp4", "video/mp4", b"vv"))?;

        assert_eq!(a, RecordId::Seq(1));
        assert_eq!(b, RecordId::Seq(2));
        // every store counts on its own
        assert_eq!(v, RecordId::Seq(1));
        Ok(())
    }

    #[test]
    fn test_put_then_get_returns_metadata() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let new = record("song.mp3", "audio/mpeg", b"some audio");

        let id = storage.put(BinaryStore::AudioFiles, new.clone())?;
        let got = storage.get(BinaryStore::AudioFiles, &id)?.unwrap();

        assert_eq!(got.id, id);
        assert_eq!(got.name, "song.mp3");
        assert_eq!(got.mime_type, "audio/mpeg");
        assert_eq!(got.size, 10);
        assert_eq!(got.payload, b"some audio");
        assert_eq!(got.uploaded_at, new.uploaded_at);
        Ok(())
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let a = storage.put(BinaryStore::AudioFiles, record("a.mp3", "audio/mpeg", b"a"))?;
        storage.delete(BinaryStore::AudioFiles, &a)?;
        let b = storage.put(BinaryStore::AudioFiles, record("b.mp3", "audio/mpeg", b"b"))?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_images_take_caller_ids() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;

        let id = storage.put(
            BinaryStore::Images,
            record("pic.png", "image/png", b"png").with_id("1700-abc".into()),
        )?;
        assert_eq!(id, RecordId::Key("1700-abc".into()));

        let missing_id = storage.put(BinaryStore::Images, record("x.png", "image/png", b"x"));
        assert!(matches!(missing_id, Err(StorageError::KeyPolicy { .. })));

        let caller_id_on_audio = storage.put(
            BinaryStore::AudioFiles,
            record("a.mp3", "audio/mpeg", b"a").with_id("nope".into()),
        );
        assert!(matches!(caller_id_on_audio, Err(StorageError::KeyPolicy { .. })));
        Ok(())
    }

    #[test]
    fn test_duplicate_image_id_is_rejected() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let first = record("one.png", "image/png", b"1").with_id("same".into());
        let second = record("two.png", "image/png", b"2").with_id("same".into());

        storage.put(BinaryStore::Images, first)?;
        let err = storage.put(BinaryStore::Images, second).unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey { .. }));
        let kept = storage
            .get(BinaryStore::Images, &RecordId::Key("same".into()))?
            .unwrap();
        assert_eq!(kept.name, "one.png");
        Ok(())
    }

    #[test]
    fn test_delete_removes_from_get_all_and_get() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let a = storage.put(BinaryStore::VideoFiles, record("a.mp4", "video/mp4", b"a"))?;
        let b = storage.put(BinaryStore::VideoFiles, record("b.mp4", "video/mp4", b"b"))?;

        storage.delete(BinaryStore::VideoFiles, &a)?;

        let all = storage.get_all(BinaryStore::VideoFiles)?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b);
        assert!(storage.get(BinaryStore::VideoFiles, &a)?.is_none());

        // deleting again is still an ack
        storage.delete(BinaryStore::VideoFiles, &a)?;
        Ok(())
    }

    #[test]
    fn test_get_missing_is_none() -> anyhow::Result<()> {
        let storage = Storage::open_in_memory()?;
        assert!(storage.get(BinaryStore::AudioFiles, &RecordId::Seq(42))?.is_none());
        assert!(storage
            .get(BinaryStore::Images, &RecordId::Key("ghost".into()))?
            .is_none());
        Ok(())
    }

    #[test]
    fn test_wrong_id_kind_is_key_policy_error() -> anyhow::Result<()> {
        let storage = Storage::open_in_memory()?;
        let err = storage
            .get(BinaryStore::AudioFiles, &RecordId::Key("1".into()))
            .unwrap_err();
        assert!(matches!(err, StorageError::KeyPolicy { .. }));
        Ok(())
    }

    #[test]
    fn test_tampered_payload_is_reported_corrupted() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        let id = storage.put(BinaryStore::AudioFiles, record("a.mp3", "audio/mpeg", b"good"))?;

        storage.db.execute(
            &format!("UPDATE {AUDIO_FILES} SET {PAYLOAD} = ?1 WHERE {ID} = 1"),
            params![b"evil".to_vec()],
        )?;

        let err = storage.get(BinaryStore::AudioFiles, &id).unwrap_err();
        assert!(matches!(err, StorageError::Corrupted { .. }));
        assert!(storage.get_all(BinaryStore::AudioFiles).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_table_surfaces_as_storage_error() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        storage.db.execute_batch(&format!("DROP TABLE {VIDEO_FILES}"))?;

        let err = storage
            .put(BinaryStore::VideoFiles, record("v.mp4", "video/mp4", b"v"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));
        Ok(())
    }

    #[test]
    fn test_count_per_store() -> anyhow::Result<()> {
        let mut storage = Storage::open_in_memory()?;
        storage.put(BinaryStore::AudioFiles, record("a.mp3", "audio/mpeg", b"a"))?;
        storage.put(BinaryStore::AudioFiles, record("b.mp3", "audio/mpeg", b"b"))?;

        assert_eq!(storage.count(BinaryStore::AudioFiles)?, 2);
        assert_eq!(storage.count(BinaryStore::Images)?, 0);
        assert_eq!(storage.schema_version()?, SCHEMA_VERSION);
        Ok(())
    }
}
