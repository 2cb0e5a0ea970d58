//! Document store: the in-memory index of record plus its durable copy
//!
//! Documents are held behind `Arc` so queries get cheap immutable views while
//! the indexer replaces entries wholesale. There is no snapshot isolation
//! across an indexing pass; a query may see some files reindexed and others
//! not yet.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::document::{estimate_tokens, IndexedDocument};

/// Errors loading or saving the durable store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no index file at {}", .0.display())]
    Missing(PathBuf),

    #[error("failed to access index file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("index file {} is corrupt: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize index: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Path-keyed collection of indexed documents
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: RwLock<BTreeMap<PathBuf, Arc<IndexedDocument>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from documents; a later duplicate path replaces an earlier one
    pub fn from_documents(docs: impl IntoIterator<Item = IndexedDocument>) -> Self {
        let store = Self::new();
        for doc in docs {
            store.upsert(doc);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<Arc<IndexedDocument>> {
        self.documents.read().get(path).cloned()
    }

    /// Insert or replace the document at `doc.path`, returning the previous one
    pub fn upsert(&self, doc: IndexedDocument) -> Option<Arc<IndexedDocument>> {
        self.documents
            .write()
            .insert(doc.path.clone(), Arc::new(doc))
    }

    pub fn remove(&self, path: &Path) -> Option<Arc<IndexedDocument>> {
        self.documents.write().remove(path)
    }

    /// All documents in path order
    pub fn snapshot(&self) -> Vec<Arc<IndexedDocument>> {
        self.documents.read().values().cloned().collect()
    }

    /// Paths of stored documents located under `root`
    pub fn paths_under(&self, root: &Path) -> Vec<PathBuf> {
        self.documents
            .read()
            .values()
            .filter(|d| d.is_under(root))
            .map(|d| d.path.clone())
            .collect()
    }

    pub fn total_tokens(&self) -> usize {
        self.documents.read().values().map(|d| d.token_count).sum()
    }

    /// Load the durable copy
    ///
    /// A missing file is [`StoreError::Missing`]; anything unparseable is
    /// [`StoreError::Parse`]. Token counts are recomputed from content.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(path.to_path_buf()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let entries: Vec<(PathBuf, IndexedDocument)> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::from_documents(entries.into_iter().map(
            |(key, mut doc)| {
                doc.path = key;
                doc.token_count = estimate_tokens(&doc.content);
                doc
            },
        )))
    }

    /// Load the durable copy, falling back to an empty store on any error
    pub async fn load_or_default(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(store) => {
                tracing::info!("Loaded {} documents from {}", store.len(), path.display());
                store
            }
            Err(StoreError::Missing(_)) => {
                tracing::debug!("No index at {}, starting empty", path.display());
                Self::new()
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable index: {}", e);
                Self::new()
            }
        }
    }

    /// Write the durable copy as an ordered list of `(path, document)` pairs
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let entries: Vec<(PathBuf, Arc<IndexedDocument>)> = self
            .documents
            .read()
            .iter()
            .map(|(p, d)| (p.clone(), d.clone()))
            .collect();
        let pairs: Vec<(&PathBuf, &IndexedDocument)> =
            entries.iter().map(|(p, d)| (p, d.as_ref())).collect();
        let json = serde_json::to_string(&pairs).map_err(StoreError::Serialize)?;

        let io_err = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
