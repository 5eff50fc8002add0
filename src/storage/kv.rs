//! Flat text entries: the bio plus a few JSON arrays.

use rusqlite::{OptionalExtension, params};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    domain::{
        contact::{ContactMessage, Subscription},
        event::EventRecord,
    },
    storage::{
        error::StorageError,
        operations::Storage,
        schema::{KEY, TEXT_ENTRIES, VALUE},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKey {
    Bio,
    Events,
    Newsletter,
    Contacts,
}

impl TextKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TextKey::Bio => "bio",
            TextKey::Events => "events",
            TextKey::Newsletter => "newsletter",
            TextKey::Contacts => "contacts",
        }
    }
}

impl Storage {
    pub fn set_text(&mut self, key: TextKey, value: &str) -> Result<(), StorageError> {
        self.db.execute(
            &format!(
                "INSERT INTO {TEXT_ENTRIES} ({KEY}, {VALUE}) VALUES (?1, ?2)
                 ON CONFLICT({KEY}) DO UPDATE SET {VALUE} = excluded.{VALUE}"
            ),
            params![key.as_str(), value],
        )?;
        Ok(())
    }

    /// `None` when the key was never written.
    pub fn text(&self, key: TextKey) -> Result<Option<String>, StorageError> {
        Ok(self
            .db
            .query_row(
                &format!("SELECT {VALUE} FROM {TEXT_ENTRIES} WHERE {KEY} = ?1"),
                params![key.as_str()],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_json_list<T: Serialize>(&mut self, key: TextKey, items: &[T]) -> Result<(), StorageError> {
        let json = serde_json::to_string(items).map_err(|source| StorageError::MalformedEntry {
            key: key.as_str(),
            source,
        })?;
        self.set_text(key, &json)
    }

    /// Empty when the key was never written.
    pub fn json_list<T: DeserializeOwned>(&self, key: TextKey) -> Result<Vec<T>, StorageError> {
        match self.text(key)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::MalformedEntry {
                key: key.as_str(),
                source,
            }),
        }
    }

    fn push_json<T: Serialize + DeserializeOwned>(&mut self, key: TextKey, item: T) -> Result<(), StorageError> {
        let mut items: Vec<T> = self.json_list(key)?;
        items.push(item);
        self.set_json_list(key, &items)
    }

    pub fn save_bio(&mut self, content: &str) -> Result<(), StorageError> {
        self.set_text(TextKey::Bio, content)
    }

    pub fn bio(&self) -> Result<Option<String>, StorageError> {
        self.text(TextKey::Bio)
    }

    pub fn save_events(&mut self, events: &[EventRecord]) -> Result<(), StorageError> {
        self.set_json_list(TextKey::Events, events)
    }

    pub fn events(&self) -> Result<Vec<EventRecord>, StorageError> {
        self.json_list(TextKey::Events)
    }

    pub fn add_newsletter_subscription(&mut self, subscription: Subscription) -> Result<(), StorageError> {
        self.push_json(TextKey::Newsletter, subscription)
    }

    pub fn newsletter_subscriptions(&self) -> Result<Vec<Subscription>, StorageError> {
        self.json_list(TextKey::Newsletter)
    }

    pub fn add_contact_message(&mut self, message: ContactMessage) -> Result<(), StorageError> {
        self.push_json(TextKey::Contacts, message)
    }

    pub fn contact_messages(&self) -> Result<Vec<ContactMessage>, StorageError> {
        self.json_list(TextKey::Contacts)
    }
}
