//! Per-item scheduling state and the stage derived from it.
use super::ContentType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ease factor every new card starts with.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;
/// Fewer reviews than this is too small a sample to call a card struggling.
pub const STRUGGLING_MIN_REVIEWS: u32 = 3;
/// Accuracy below this (with enough reviews) marks a card as struggling.
pub const STRUGGLING_ACCURACY: f64 = 0.6;

/// Scheduling state for one (content type, content id) pair.
///
/// Serialized with camelCase keys and ISO dates; "never" dates are written as
/// an empty string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub id: String,
    pub content_type: ContentType,
    pub content_id: String,
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
    pub due_date: NaiveDate,
    #[serde(default, with = "empty_date")]
    pub last_review_date: Option<NaiveDate>,
    pub total_reviews: u32,
    pub total_correct: u32,
    #[serde(default, with = "empty_date")]
    pub last_incorrect_date: Option<NaiveDate>,
}

impl ReviewCard {
    /// A never-reviewed card, due immediately.
    pub fn new(content_type: ContentType, content_id: impl Into<String>, today: NaiveDate) -> Self {
        let content_id = content_id.into();
        Self {
            id: Self::card_id(content_type, &content_id),
            content_type,
            content_id,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            due_date: today,
            last_review_date: None,
            total_reviews: 0,
            total_correct: 0,
            last_incorrect_date: None,
        }
    }

    /// Composite key, e.g. `vocabulary-v001`.
    pub fn card_id(content_type: ContentType, content_id: &str) -> String {
        format!("{}-{}", content_type, content_id)
    }

    pub fn stage(&self) -> Stage {
        if self.repetitions == 0 && self.interval == 0 {
            Stage::New
        } else if self.interval < 7 {
            Stage::Learning
        } else if self.interval < 21 {
            Stage::Review
        } else {
            Stage::Mature
        }
    }

    pub fn is_struggling(&self) -> bool {
        self.total_reviews >= STRUGGLING_MIN_REVIEWS
            && (self.total_correct as f64 / self.total_reviews as f64) < STRUGGLING_ACCURACY
    }

    /// Lifetime accuracy, `None` before the first review.
    pub fn accuracy(&self) -> Option<f64> {
        (self.total_reviews > 0).then(|| self.total_correct as f64 / self.total_reviews as f64)
    }
}

/// Coarse progress bucket derived from `(repetitions, interval)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    New,
    Learning,
    Review,
    Mature,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::New, Stage::Learning, Stage::Review, Stage::Mature];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::New => "new",
            Stage::Learning => "learning",
            Stage::Review => "review",
            Stage::Mature => "mature",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Option<NaiveDate>` as `YYYY-MM-DD`, with `""` for `None`.
pub(crate) mod empty_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.collect_str(d),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(de::Error::custom)
    }
}
