//! The kinds of content that get a review card.
use crate::error::StudyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scheduled content kinds. Reading passages are scored per attempt and never
/// get a review card, so they are not represented here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Vocabulary,
    Grammar,
    Listening,
}

impl ContentType {
    /// Fixed order used for interleaving and per-type reports.
    pub const ALL: [ContentType; 3] = [
        ContentType::Vocabulary,
        ContentType::Grammar,
        ContentType::Listening,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Vocabulary => "vocabulary",
            ContentType::Grammar => "grammar",
            ContentType::Listening => "listening",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vocabulary" | "vocab" => Ok(ContentType::Vocabulary),
            "grammar" => Ok(ContentType::Grammar),
            "listening" => Ok(ContentType::Listening),
            other => Err(StudyError::UnknownContentType(other.to_string())),
        }
    }
}
