//! Error type shared by the scheduling core and its storage/config adapters.

use thiserror::Error;

/// Errors surfaced by the library.
///
/// The scheduling functions themselves are infallible; everything here comes
/// from input validation at the boundary or from the collaborators (SQLite,
/// JSON, TOML, the filesystem).
#[derive(Debug, Error)]
pub enum StudyError {
    /// A rating outside {0, 3, 4, 5}.
    #[error("invalid rating {0}: expected 0 (again), 3 (hard), 4 (good) or 5 (easy)")]
    InvalidRating(u8),

    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    /// A date string that is not `YYYY-MM-DD`.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("review card not found: {0}")]
    CardNotFound(String),

    #[error("{content_type} item {content_id:?} is not in the catalog")]
    NotInCatalog {
        content_type: crate::models::ContentType,
        content_id: String,
    },

    #[error("unsupported export version {0} (expected 1)")]
    UnsupportedExportVersion(u32),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StudyError>;
