use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry of the `newsletter` text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub email: String,
    pub date: DateTime<Utc>,
}

/// Entry of the `contacts` text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
    pub date: DateTime<Utc>,
}
