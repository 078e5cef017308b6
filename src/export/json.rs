//! JSON export/import of all study progress.
//! The file carries a format version; only version 1 is understood.

use crate::database::{CardStore, SqliteStore};
use crate::error::{Result, StudyError};
use crate::models::{ReviewCard, Streak, StudyRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawExport")]
pub struct ExportData {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    pub review_cards: Vec<ReviewCard>,
    pub sessions: Vec<StudyRecord>,
    pub streak: Streak,
}

/// On-disk shape. Files written by the web app carry no `streak` key and keep
/// the streak under `settings` instead.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExport {
    version: u32,
    export_date: DateTime<Utc>,
    review_cards: Vec<ReviewCard>,
    #[serde(default)]
    sessions: Vec<StudyRecord>,
    #[serde(default)]
    streak: Option<Streak>,
    #[serde(default)]
    settings: Option<WebSettings>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebSettings {
    #[serde(default)]
    streak_count: u32,
    #[serde(default, with = "crate::models::review_card::empty_date")]
    last_study_date: Option<NaiveDate>,
}

impl From<RawExport> for ExportData {
    fn from(raw: RawExport) -> Self {
        let streak = raw
            .streak
            .or_else(|| {
                raw.settings.map(|s| Streak {
                    count: s.streak_count,
                    last_study_date: s.last_study_date,
                })
            })
            .unwrap_or_default();
        Self {
            version: raw.version,
            export_date: raw.export_date,
            review_cards: raw.review_cards,
            sessions: raw.sessions,
            streak,
        }
    }
}

impl ExportData {
    /// Snapshot of everything in the store.
    pub fn collect(store: &SqliteStore, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            version: EXPORT_VERSION,
            export_date: now,
            review_cards: store.read_all_cards()?,
            sessions: store.study_records()?,
            streak: store.streak()?,
        })
    }

    /// Parses and checks the format version.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: ExportData = serde_json::from_str(json)?;
        if data.version != EXPORT_VERSION {
            return Err(StudyError::UnsupportedExportVersion(data.version));
        }
        Ok(data)
    }

    /// Replaces the store's contents with this export.
    pub fn restore_into(&self, store: &mut SqliteStore) -> Result<()> {
        store.replace_all(&self.review_cards, &self.sessions, &self.streak)
    }
}

/// Writes pretty-printed JSON to `path`.
pub fn export_json_to_path(data: &ExportData, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(data)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!(path = %path.display(), cards = data.review_cards.len(), "exported progress");
    Ok(())
}

/// Reads and validates an export file.
pub fn import_json(path: &Path) -> Result<ExportData> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    let data = ExportData::from_json(&contents)?;
    info!(path = %path.display(), cards = data.review_cards.len(), "read progress export");
    Ok(data)
}
