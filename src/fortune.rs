//! Fortune records and the fortune-file format
//!
//! A fortune file is plain UTF-8 text where entries are separated by a line
//! holding a single `%`. Each entry becomes one row in the `fortune` table.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

/// Separator between entries in a fortune file.
pub const ENTRY_SEPARATOR: &str = "%\n";

/// Which column carries the table's UNIQUE constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UniquenessMode {
    /// SHA-256 fingerprint column, independent of text length
    #[default]
    ContentHash,
    /// UNIQUE directly on the text column
    RawText,
}

impl UniquenessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniquenessMode::ContentHash => "content-hash",
            UniquenessMode::RawText => "raw-text",
        }
    }

    pub fn uses_hash(&self) -> bool {
        matches!(self, UniquenessMode::ContentHash)
    }
}

impl FromStr for UniquenessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "content-hash" | "content_hash" | "hash" | "sha256" => Ok(UniquenessMode::ContentHash),
            "raw-text" | "raw_text" | "text" => Ok(UniquenessMode::RawText),
            _ => Err(Error::Config(format!("Unknown uniqueness mode: {}", s))),
        }
    }
}

impl std::fmt::Display for UniquenessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored fortune.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortune {
    pub id: i64,
    pub text: String,
    pub date_added: DateTime<Utc>,
    /// Absent when the table uses raw-text uniqueness
    pub content_hash: Option<String>,
}

/// A fortune about to be inserted (id assigned by the database).
#[derive(Debug, Clone)]
pub struct NewFortune {
    pub text: String,
    pub date_added: DateTime<Utc>,
    pub content_hash: Option<String>,
}

impl NewFortune {
    /// Build a record stamped with the current time, fingerprinted when `mode` needs it.
    pub fn new(text: impl Into<String>, mode: UniquenessMode) -> Self {
        let text = text.into();
        let content_hash = mode.uses_hash().then(|| fingerprint(&text));
        Self {
            text,
            date_added: Utc::now(),
            content_hash,
        }
    }

    /// Short label for log lines.
    pub fn key(&self) -> &str {
        self.content_hash.as_deref().unwrap_or(&self.text)
    }
}

/// SHA-256 hex digest of the entry's UTF-8 bytes, no normalization.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Split fortune-file contents into entries.
///
/// Empty input still yields one (empty) entry, and a trailing separator
/// yields a trailing empty entry.
pub fn split_entries(contents: &str) -> Vec<&str> {
    contents.split(ENTRY_SEPARATOR).collect()
}
