//! Source of "today" as a calendar date.
//!
//! Scheduling works on calendar days in the learner's local time zone, never on
//! instants, so the clock hands out a `NaiveDate` and nothing else.

use crate::error::{Result, StudyError};
use chrono::{Local, NaiveDate};

pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The learner's local calendar day.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same day. Used by tests and by `--today`.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| StudyError::InvalidDate(s.to_string()))
}
