//! Study log entries and the daily streak.
use super::ContentType;
use crate::error::StudyError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of the app a study log entry came from.
/// Wider than `ContentType`: reading passages are logged but never scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyModule {
    Vocabulary,
    Grammar,
    Reading,
    Listening,
}

impl StudyModule {
    pub fn as_str(self) -> &'static str {
        match self {
            StudyModule::Vocabulary => "vocabulary",
            StudyModule::Grammar => "grammar",
            StudyModule::Reading => "reading",
            StudyModule::Listening => "listening",
        }
    }
}

impl From<ContentType> for StudyModule {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::Vocabulary => StudyModule::Vocabulary,
            ContentType::Grammar => StudyModule::Grammar,
            ContentType::Listening => StudyModule::Listening,
        }
    }
}

impl fmt::Display for StudyModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudyModule {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(StudyModule::Reading),
            other => other.parse::<ContentType>().map(StudyModule::from),
        }
    }
}

/// One completed session for one module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRecord {
    pub date: NaiveDate,
    pub module: StudyModule,
    pub cards_reviewed: u32,
    pub cards_correct: u32,
    pub new_cards_studied: u32,
}

/// Consecutive days with at least one completed session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub count: u32,
    pub last_study_date: Option<NaiveDate>,
}

impl Streak {
    /// Streak after studying on `today`.
    pub fn record_study(self, today: NaiveDate) -> Streak {
        if self.last_study_date == Some(today) {
            return self;
        }
        let continues = self
            .last_study_date
            .and_then(|last| last.succ_opt())
            .is_some_and(|next_day| next_day == today);
        Streak {
            count: if continues { self.count + 1 } else { 1 },
            last_study_date: Some(today),
        }
    }

    /// The streak as it stands on `today`: zero once a full day was missed.
    pub fn current(self, today: NaiveDate) -> u32 {
        match self.last_study_date {
            Some(last) if last == today || last.succ_opt() == Some(today) => self.count,
            _ => 0,
        }
    }
}

/// Sums the records for one day: (reviewed, correct, new).
pub fn totals_for_day(records: &[StudyRecord], day: NaiveDate) -> (u32, u32, u32) {
    records
        .iter()
        .filter(|r| r.date == day)
        .fold((0, 0, 0), |(reviewed, correct, new), r| {
            (
                reviewed + r.cards_reviewed,
                correct + r.cards_correct,
                new + r.new_cards_studied,
            )
        })
}
