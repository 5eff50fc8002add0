use thiserror::Error;

use crate::{config::MIB, storage::error::StorageError};

/// "10MB", "512KB" or "300 bytes", whichever unit keeps the limit whole.
pub fn format_limit(bytes: &u64) -> String {
    match *bytes {
        b if b >= MIB && b % MIB == 0 => format!("{}MB", b / MIB),
        b if b >= 1024 && b % 1024 == 0 => format!("{}KB", b / 1024),
        b => format!("{b} bytes"),
    }
}

/// Input refused before it reaches storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{name} is not a valid {expected} file")]
    UnsupportedType { name: String, expected: &'static str },

    #[error("{name} is not an image")]
    NotAnImage { name: String },

    #[error("{name} is too large (max {})", format_limit(.max_bytes))]
    TooLarge { name: String, max_bytes: u64 },

    #[error("Please select {0} to upload")]
    NothingSelected(&'static str),

    #[error("Please enter {0}.")]
    MissingField(&'static str),

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Please enter a message (at least {min} characters).")]
    MessageTooShort { min: usize },
}

/// A privileged action attempted without admin login.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("You must be logged in to {action}.")]
pub struct AuthorizationError {
    pub action: &'static str,
}

#[derive(Debug, Error)]
pub enum SiteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
}
