use std::fmt::Display;

use chrono::{DateTime, Utc};

use super::hash::ContentHash;

/// Binary object stores of the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryStore {
    AudioFiles,
    VideoFiles,
    Images,
}

/// How a store assigns ids to new records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// the store hands out sequential integer ids
    AutoIncrement,
    /// the caller supplies a string id
    CallerAssigned,
}

impl BinaryStore {
    pub const ALL: [BinaryStore; 3] = [Self::AudioFiles, Self::VideoFiles, Self::Images];

    pub fn key_policy(self) -> KeyPolicy {
        match self {
            Self::AudioFiles | Self::VideoFiles => KeyPolicy::AutoIncrement,
            Self::Images => KeyPolicy::CallerAssigned,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::AudioFiles => "audioFiles",
            Self::VideoFiles => "videoFiles",
            Self::Images => "images",
        }
    }

    /// Parses a textual id the way this store's keys look.
    pub fn parse_id(self, raw: &str) -> Option<RecordId> {
        match self.key_policy() {
            KeyPolicy::AutoIncrement => raw.parse().ok().map(RecordId::Seq),
            KeyPolicy::CallerAssigned if !raw.is_empty() => Some(RecordId::Key(raw.to_string())),
            KeyPolicy::CallerAssigned => None,
        }
    }
}

impl Display for BinaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    Seq(i64),
    Key(String),
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Seq(n) => write!(f, "{n}"),
            RecordId::Key(k) => write!(f, "{k}"),
        }
    }
}

/// A record as handed to `put`. The id is only set for caller-assigned stores.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub id: Option<String>,
    pub name: String,
    pub mime_type: String,
    pub payload: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
}

impl NewRecord {
    pub fn from_candidate(file: FileCandidate, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: file.name,
            mime_type: file.mime_type,
            payload: file.content,
            uploaded_at,
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }
}

/// A stored audio, video or image file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub id: RecordId,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub payload: Vec<u8>,
    pub checksum: ContentHash,
    pub uploaded_at: DateTime<Utc>,
}

/// A file picked by the user, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Vec<u8>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: content.len() as u64,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
    Image,
}

impl MediaKind {
    pub fn store(self) -> BinaryStore {
        match self {
            MediaKind::Audio => BinaryStore::AudioFiles,
            MediaKind::Video => BinaryStore::VideoFiles,
            MediaKind::Image => BinaryStore::Images,
        }
    }

    /// Noun used in upload summaries, e.g. "3 image(s) uploaded."
    pub fn noun(self) -> &'static str {
        match self {
            MediaKind::Audio => "track",
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

/// Drops the last extension from a file name: "song.final.mp3" -> "song.final".
pub fn display_title(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 && !name[dot + 1..].contains('/') && dot + 1 < name.len() => {
            &name[..dot]
        }
        _ => name,
    }
}
