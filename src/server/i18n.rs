//! Translation maps served by `/api/language` and `/api/supportedlanguage`.
//!
//! Layout: `<dir>/<code>.json` holds a flat `{ key: text }` map,
//! `<dir>/language.json` lists the available `{ code, name }` pairs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::location::LanguageEntry;

const INDEX_FILE: &str = "language";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Language is invalid.")]
    Invalid,
    #[error("Language is not supported.")]
    Unsupported,
    #[error("cannot load {}: {reason}", path.display())]
    Broken { path: PathBuf, reason: String },
}

#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    dir: PathBuf,
}

impl LanguageCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn translations(&self, code: &str) -> Result<BTreeMap<String, String>, CatalogError> {
        if !is_language_tag(code) || code == INDEX_FILE {
            return Err(CatalogError::Invalid);
        }
        let path = self.dir.join(format!("{}.json", code));
        if !path.is_file() {
            return Err(CatalogError::Unsupported);
        }
        read_json(&path)
    }

    pub fn supported(&self) -> Result<Vec<LanguageEntry>, CatalogError> {
        read_json(&self.dir.join(format!("{}.json", INDEX_FILE)))
    }
}

/// `en`, `pt-BR`, `zh_Hant`: letters, digits, `-` and `_` only, so a code
/// can never name a path outside the catalog.
fn is_language_tag(code: &str) -> bool {
    (2..=16).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let broken = |reason: String| CatalogError::Broken {
        path: path.to_path_buf(),
        reason,
    };
    let data = fs::read_to_string(path).map_err(|e| broken(e.to_string()))?;
    serde_json::from_str(&data).map_err(|e| broken(e.to_string()))
}
