use chrono::{NaiveDate, Utc};

/// Source of "today" for the write path.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The server's wall clock, as a UTC calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
