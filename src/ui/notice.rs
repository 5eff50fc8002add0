use std::fmt::Display;

use crate::{error::SiteError, storage::error::StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

/// A user-visible message, as shown in the site's notification toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

impl From<&StorageError> for Notice {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::QuotaExceeded(_) => {
                Notice::error("Storage is full. Delete some media and try again.")
            }
            StorageError::Blocked(_) => {
                Notice::error("Storage is busy in another window. Please try again.")
            }
            StorageError::Unavailable(_) => Notice::error("Storage is not available right now."),
            StorageError::VersionConflict { .. } => {
                Notice::error("Saved data comes from a newer version of this site.")
            }
            StorageError::DuplicateKey { .. } => {
                Notice::error("That item already exists. Please try again.")
            }
            StorageError::Corrupted { .. } | StorageError::MalformedEntry { .. } => {
                Notice::error("Some saved data is damaged and could not be loaded.")
            }
            StorageError::Fs(e) => Notice::error(format!("Could not read file: {e}")),
            StorageError::KeyPolicy { .. }
            | StorageError::Database(_)
            | StorageError::Internal(_) => {
                Notice::error("Something went wrong while saving. Please try again.")
            }
        }
    }
}

impl From<&SiteError> for Notice {
    fn from(err: &SiteError) -> Self {
        match err {
            SiteError::Storage(e) => Notice::from(e),
            SiteError::Validation(e) => Notice::error(e.to_string()),
            SiteError::Authorization(e) => Notice::error(e.to_string()),
        }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            Level::Success => "ok",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        write!(f, "[{tag}] {}", self.message)
    }
}
