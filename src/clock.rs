use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of timestamps for ids, upload dates and the events filter.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar date, used for day-granularity comparisons.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
