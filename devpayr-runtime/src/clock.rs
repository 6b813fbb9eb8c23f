//! Source of "today" for the validation cache.

use chrono::{NaiveDate, Utc};

/// Supplies the current UTC calendar date.
pub trait Clock: Send + Sync {
    /// Today's date in UTC.
    fn today(&self) -> NaiveDate;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
