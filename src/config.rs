//! Study configuration (TOML).
//!
//! ```toml
//! database_path = "study.sqlite3"
//! catalog_dir = "catalog"
//!
//! [daily_new]
//! vocabulary = 20
//! grammar = 5
//! listening = 5
//! ```

use crate::error::{Result, StudyError};
use crate::models::ContentType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Daily caps on newly admitted items, per content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyNewLimits {
    #[serde(default = "default_vocabulary")]
    pub vocabulary: usize,
    #[serde(default = "default_grammar")]
    pub grammar: usize,
    #[serde(default = "default_listening")]
    pub listening: usize,
}

fn default_vocabulary() -> usize {
    20
}
fn default_grammar() -> usize {
    5
}
fn default_listening() -> usize {
    5
}

impl Default for DailyNewLimits {
    fn default() -> Self {
        Self {
            vocabulary: default_vocabulary(),
            grammar: default_grammar(),
            listening: default_listening(),
        }
    }
}

impl DailyNewLimits {
    pub fn for_type(&self, content_type: ContentType) -> usize {
        match content_type {
            ContentType::Vocabulary => self.vocabulary,
            ContentType::Grammar => self.grammar,
            ContentType::Listening => self.listening,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub daily_new: DailyNewLimits,
    /// SQLite file holding cards, the study log and the streak.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Directory with `vocabulary.json`, `grammar.json`, `listening.json`.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("study.sqlite3")
}
fn default_catalog_dir() -> PathBuf {
    PathBuf::from("catalog")
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            daily_new: DailyNewLimits::default(),
            database_path: default_database_path(),
            catalog_dir: default_catalog_dir(),
        }
    }
}

impl StudyConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Applies `STUDY_SRS_DB` / `STUDY_SRS_CATALOG` overrides.
    pub fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(db) = get("STUDY_SRS_DB") {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = get("STUDY_SRS_CATALOG") {
            self.catalog_dir = PathBuf::from(dir);
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `study.toml` in the current directory
/// 2. `~/.config/study-srs/config.toml`
///
/// Falls back to defaults when neither exists. An explicit path must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<StudyConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => {
            return Err(StudyError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", p.display()),
            )));
        }
        None => [Some(PathBuf::from("study.toml")), home_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "reading config");
            StudyConfig::from_toml(&std::fs::read_to_string(&path)?)?
        }
        None => StudyConfig::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn home_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("study-srs")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StudyConfig::default();
        assert_eq!(config.daily_new.vocabulary, 20);
        assert_eq!(config.daily_new.grammar, 5);
        assert_eq!(config.daily_new.listening, 5);
        assert_eq!(config.database_path, PathBuf::from("study.sqlite3"));
    }

    #[test]
    fn parse_partial_config() {
        let config = StudyConfig::from_toml(
            r#"
catalog_dir = "/data/jlpt"

[daily_new]
vocabulary = 40
"#,
        )
        .unwrap();
        assert_eq!(config.daily_new.for_type(ContentType::Vocabulary), 40);
        assert_eq!(config.daily_new.for_type(ContentType::Grammar), 5);
        assert_eq!(config.catalog_dir, PathBuf::from("/data/jlpt"));
        assert_eq!(config.database_path, PathBuf::from("study.sqlite3"));
    }

    #[test]
    fn reject_negative_cap() {
        let err = StudyConfig::from_toml("[daily_new]\ngrammar = -1\n").unwrap_err();
        assert!(matches!(err, StudyError::Config(_)));
    }

    #[test]
    fn env_overrides() {
        let mut config = StudyConfig::default();
        config.apply_env_overrides(|key| match key {
            "STUDY_SRS_DB" => Some("/tmp/other.sqlite3".to_string()),
            _ => None,
        });
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.sqlite3"));
        assert_eq!(config.catalog_dir, PathBuf::from("catalog"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config_from(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.toml");
        std::fs::write(&path, "[daily_new]\nlistening = 2\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.daily_new.listening, 2);
    }
}
