//! Content catalogs: the ordered list of item ids per content type.
//!
//! Catalog order is admission order, so loaders must preserve it. Only the
//! `id` of each item matters here; everything else in the files is ignored.
//!
//! On disk a catalog directory holds `vocabulary.json`, `grammar.json` and
//! `listening.json`, each a JSON array of objects with an `id` field. A
//! listening entry that carries an `expressions` array is a video; each
//! expression is a separate item with id `{video id}-{index}`.

use crate::error::Result;
use crate::models::ContentType;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    pub content_type: ContentType,
    pub ids: Vec<String>,
}

impl Catalog {
    pub fn new<I, S>(content_type: ContentType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content_type,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty(content_type: ContentType) -> Self {
        Self { content_type, ids: Vec::new() }
    }

    pub fn id_set(&self) -> HashSet<&str> {
        self.ids.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, content_id: &str) -> bool {
        self.ids.iter().any(|id| id == content_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Parses one catalog file's contents.
    pub fn from_json(content_type: ContentType, json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let ids = entries
            .into_iter()
            .flat_map(|entry| match entry.expressions {
                Some(expressions) => (0..expressions.len())
                    .map(|idx| format!("{}-{}", entry.id, idx))
                    .collect::<Vec<_>>(),
                None => vec![entry.id],
            })
            .collect();
        Ok(Self { content_type, ids })
    }

    /// Loads `<dir>/<content type>.json`; a missing file is an empty catalog.
    pub fn load(dir: &Path, content_type: ContentType) -> Result<Self> {
        let path = dir.join(format!("{}.json", content_type));
        if !path.exists() {
            debug!(path = %path.display(), "no catalog file");
            return Ok(Self::empty(content_type));
        }
        let contents = std::fs::read_to_string(&path)?;
        let catalog = Self::from_json(content_type, &contents)?;
        debug!(path = %path.display(), items = catalog.len(), "loaded catalog");
        Ok(catalog)
    }
}

#[derive(Deserialize)]
struct CatalogEntry {
    id: String,
    #[serde(default)]
    expressions: Option<Vec<serde::de::IgnoredAny>>,
}

/// One catalog per content type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSet {
    pub vocabulary: Catalog,
    pub grammar: Catalog,
    pub listening: Catalog,
}

impl CatalogSet {
    pub fn new(vocabulary: Catalog, grammar: Catalog, listening: Catalog) -> Self {
        Self { vocabulary, grammar, listening }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let set = Self {
            vocabulary: Catalog::load(dir, ContentType::Vocabulary)?,
            grammar: Catalog::load(dir, ContentType::Grammar)?,
            listening: Catalog::load(dir, ContentType::Listening)?,
        };
        info!(
            dir = %dir.display(),
            vocabulary = set.vocabulary.len(),
            grammar = set.grammar.len(),
            listening = set.listening.len(),
            "catalogs loaded"
        );
        Ok(set)
    }

    pub fn get(&self, content_type: ContentType) -> &Catalog {
        match content_type {
            ContentType::Vocabulary => &self.vocabulary,
            ContentType::Grammar => &self.grammar,
            ContentType::Listening => &self.listening,
        }
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self {
            vocabulary: Catalog::empty(ContentType::Vocabulary),
            grammar: Catalog::empty(ContentType::Grammar),
            listening: Catalog::empty(ContentType::Listening),
        }
    }
}
