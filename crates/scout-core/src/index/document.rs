//! Indexed document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::extractor::{self, FileMetadata};
use super::language::Language;

/// Approximate token count: one token per four characters, rounded up
pub fn estimate_tokens(content: &str) -> usize {
    content.chars().count().div_ceil(4)
}

/// Refinement of a document's language used for type-specific boosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum FileType {
    /// Plain source file, same as its language
    Source(Language),
    /// Test file in the given language
    Test(Language),
    /// React component (JS/TS only)
    ReactComponent,
    /// Well-known configuration file
    Config,
    /// Markdown or README
    Documentation,
}

impl FileType {
    pub fn as_string(&self) -> String {
        match self {
            Self::Source(lang) => lang.as_str().to_string(),
            Self::Test(lang) => format!("{}-test", lang.as_str()),
            Self::ReactComponent => "react-component".to_string(),
            Self::Config => "config".to_string(),
            Self::Documentation => "documentation".to_string(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "react-component" => Some(Self::ReactComponent),
            "config" => Some(Self::Config),
            "documentation" => Some(Self::Documentation),
            other => match other.strip_suffix("-test") {
                Some(lang) => Language::parse(lang).map(Self::Test),
                None => Language::parse(other).map(Self::Source),
            },
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test(_))
    }

    pub fn is_ui_component(&self) -> bool {
        matches!(self, Self::ReactComponent)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<FileType> for String {
    fn from(ft: FileType) -> Self {
        ft.as_string()
    }
}

impl TryFrom<String> for FileType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("unknown file type: {}", s))
    }
}

/// One indexed source file with its extracted metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDocument {
    pub path: PathBuf,
    pub content: String,
    pub language: Language,
    pub last_modified: DateTime<Utc>,
    pub token_count: usize,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    pub file_type: FileType,
}

impl IndexedDocument {
    /// Build a document from freshly read content
    ///
    /// Language comes from the extension, metadata from the extractor and
    /// `token_count` from `content`.
    pub fn build(path: PathBuf, content: String, last_modified: DateTime<Utc>) -> Self {
        let language = Language::from_path(&path);
        let FileMetadata {
            symbols,
            imports,
            exports,
            comments,
            file_type,
        } = extractor::extract_for_path(&path, &content, language);

        Self {
            token_count: estimate_tokens(&content),
            path,
            content,
            language,
            last_modified,
            symbols,
            imports,
            exports,
            comments,
            file_type,
        }
    }

    /// Whether the file on disk is newer than this copy
    pub fn is_stale(&self, on_disk: DateTime<Utc>) -> bool {
        on_disk > self.last_modified
    }

    pub fn is_under(&self, root: &Path) -> bool {
        self.path.starts_with(root)
    }
}
