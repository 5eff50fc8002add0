use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A scheduled show, persisted in the `events` text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// creation time in unix milliseconds
    pub id: i64,
    pub date: NaiveDate,
    pub venue: String,
    pub location: String,
    #[serde(default, rename = "ticketLink", skip_serializing_if = "Option::is_none")]
    pub ticket_url: Option<String>,
}

impl EventRecord {
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}

/// Event form input before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub date: NaiveDate,
    pub venue: String,
    pub location: String,
    pub ticket_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    Upcoming,
    Past,
    All,
}

impl EventFilter {
    pub fn accepts(self, event: &EventRecord, today: NaiveDate) -> bool {
        match self {
            EventFilter::Upcoming => !event.is_past(today),
            EventFilter::Past => event.is_past(today),
            EventFilter::All => true,
        }
    }
}

impl FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(EventFilter::Upcoming),
            "past" => Ok(EventFilter::Past),
            "all" => Ok(EventFilter::All),
            other => Err(format!("unknown event filter '{other}'")),
        }
    }
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// "Jan 5, 2026"
pub fn format_event_date(date: NaiveDate) -> String {
    format!("{} {}, {}", MONTHS[date.month0() as usize], date.day(), date.year())
}
