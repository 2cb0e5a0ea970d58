//! Orchestrates indexing passes over workspace roots
//!
//! A pass enumerates every root, filters candidates, re-reads only files whose
//! modification time moved past the stored copy, prunes documents that are no
//! longer eligible and finally persists the store.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::document::IndexedDocument;
use super::store::DocumentStore;
use crate::access::AccessFilter;
use crate::config::RetrievalConfig;

/// Bytes sniffed for NUL when deciding a file is binary
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Phases of an indexing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    Scanning,
    Indexing,
    Pruning,
    Persisting,
    Complete,
}

/// Progress update sent while a pass runs
#[derive(Debug, Clone)]
pub struct IndexProgress {
    pub phase: IndexPhase,
    pub root: Option<PathBuf>,
    pub files_total: usize,
    pub files_done: usize,
}

/// Counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub roots: usize,
    pub failed_roots: usize,
    pub scanned: usize,
    pub indexed: usize,
    pub unchanged: usize,
    pub skipped_too_large: usize,
    pub skipped_binary: usize,
    pub denied: usize,
    pub failed: usize,
    pub removed: usize,
    pub persisted: bool,
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files scanned in {} root(s): {} indexed, {} unchanged, {} too large, {} binary, {} denied, {} failed, {} removed{}",
            self.scanned,
            self.roots,
            self.indexed,
            self.unchanged,
            self.skipped_too_large,
            self.skipped_binary,
            self.denied,
            self.failed,
            self.removed,
            if self.persisted { "" } else { " (not persisted)" }
        )
    }
}

/// Result of a `reindex` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    Completed(IndexStats),
    /// Another pass was in flight; nothing was done
    AlreadyRunning,
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Indexed,
    Unchanged,
    TooLarge,
    Binary,
    Denied,
    Missing,
    Failed,
}

impl FileOutcome {
    /// Whether a stored document for this file should survive pruning
    fn keeps_document(self) -> bool {
        matches!(self, Self::Indexed | Self::Unchanged | Self::Failed)
    }
}

/// Clears the in-flight flag when a pass ends, however it ends
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Walks roots and keeps the document store current
pub struct Indexer {
    store: Arc<DocumentStore>,
    filter: Arc<dyn AccessFilter>,
    config: RetrievalConfig,
    in_flight: AtomicBool,
    /// Roots seen by earlier passes, used to scope ignored-dir checks
    roots: Mutex<Vec<PathBuf>>,
    /// Paths updated by single-file hooks while a pass is running
    touched: Mutex<HashSet<PathBuf>>,
    progress: Option<UnboundedSender<IndexProgress>>,
}

impl Indexer {
    pub fn new(
        store: Arc<DocumentStore>,
        filter: Arc<dyn AccessFilter>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            filter,
            config,
            in_flight: AtomicBool::new(false),
            roots: Mutex::new(Vec::new()),
            touched: Mutex::new(HashSet::new()),
            progress: None,
        }
    }

    /// Send progress updates to `tx` during passes
    pub fn with_progress(mut self, tx: UnboundedSender<IndexProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Whether a pass is currently running
    pub fn is_indexing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<PassGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                self.touched.lock().clear();
                PassGuard(&self.in_flight)
            })
    }

    /// Run a full pass over `roots`
    ///
    /// Returns [`IndexOutcome::AlreadyRunning`] immediately if a pass is in
    /// flight on this indexer. Per-file and per-root failures are logged and
    /// counted, never returned.
    pub async fn reindex(&self, roots: &[PathBuf]) -> IndexOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("Indexing pass already in flight, ignoring request");
            return IndexOutcome::AlreadyRunning;
        };

        let mut stats = IndexStats::default();

        for root in roots {
            let root = absolutize(root);
            self.remember_root(&root);
            stats.roots += 1;
            self.emit(IndexPhase::Scanning, Some(&root), 0, 0);

            let (files, complete) = match self.enumerate(&root).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!("Skipping root {}: {:#}", root.display(), e);
                    stats.failed_roots += 1;
                    continue;
                }
            };

            let kept = self.index_root(&root, files, &mut stats).await;

            if complete {
                self.emit(IndexPhase::Pruning, Some(&root), 0, 0);
                stats.removed += self.prune(&root, &kept);
            } else {
                debug!(
                    "Enumeration of {} was partial, not pruning",
                    root.display()
                );
            }
        }

        self.emit(IndexPhase::Persisting, None, 0, 0);
        stats.persisted = self.persist().await;
        self.emit(IndexPhase::Complete, None, stats.scanned, stats.scanned);

        info!("Indexing pass finished: {}", stats);
        IndexOutcome::Completed(stats)
    }

    /// Index (or drop) one file after a change notification
    ///
    /// Files under an ignored directory are treated as denied. When a pass is
    /// running, the path is exempt from that pass's pruning.
    pub async fn index_file(&self, path: &Path) -> FileOutcome {
        let path = absolutize(path);
        if self.is_indexing() {
            self.touched.lock().insert(path.clone());
        }
        let outcome = if self.in_ignored_dir(&path) {
            FileOutcome::Denied
        } else {
            self.index_path(&path).await
        };
        if !outcome.keeps_document() && self.store.remove(&path).is_some() {
            debug!("Dropped {} ({:?})", path.display(), outcome);
        }
        self.persist().await;
        outcome
    }

    /// Drop one file after a delete notification
    pub async fn remove_file(&self, path: &Path) -> bool {
        let removed = self.store.remove(&absolutize(path)).is_some();
        if removed {
            self.persist().await;
        }
        removed
    }

    /// List candidate files under `root`
    ///
    /// The flag is false when some entries could not be read, in which case
    /// the listing is incomplete.
    async fn enumerate(&self, root: &Path) -> Result<(Vec<PathBuf>, bool)> {
        let metadata = tokio::fs::metadata(root)
            .await
            .with_context(|| format!("cannot stat {}", root.display()))?;
        if !metadata.is_dir() {
            bail!("{} is not a directory", root.display());
        }

        let root = root.to_path_buf();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let mut files = Vec::new();
            let mut complete = true;

            let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| config.is_ignored_dir(name))
            });

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error walking {}: {}", root.display(), e);
                        complete = false;
                    }
                }
            }

            (files, complete)
        })
        .await
        .context("directory walk panicked")
    }

    /// Process every file of one root, returning the paths whose documents stay
    async fn index_root(
        &self,
        root: &Path,
        files: Vec<PathBuf>,
        stats: &mut IndexStats,
    ) -> HashSet<PathBuf> {
        let total = files.len();
        stats.scanned += total;
        self.emit(IndexPhase::Indexing, Some(root), total, 0);

        let mut kept = HashSet::with_capacity(total);
        let mut results = stream::iter(files)
            .map(|path| async move {
                let outcome = self.index_path(&path).await;
                (path, outcome)
            })
            .buffer_unordered(self.config.read_concurrency.max(1));

        let mut done = 0;
        while let Some((path, outcome)) = results.next().await {
            done += 1;
            match outcome {
                FileOutcome::Indexed => stats.indexed += 1,
                FileOutcome::Unchanged => stats.unchanged += 1,
                FileOutcome::TooLarge => stats.skipped_too_large += 1,
                FileOutcome::Binary => stats.skipped_binary += 1,
                FileOutcome::Denied => stats.denied += 1,
                FileOutcome::Missing => {}
                FileOutcome::Failed => stats.failed += 1,
            }
            if outcome.keeps_document() {
                kept.insert(path);
            }
            self.emit(IndexPhase::Indexing, Some(root), total, done);
        }

        kept
    }

    async fn index_path(&self, path: &Path) -> FileOutcome {
        if !self.filter.is_accessible(path) {
            return FileOutcome::Denied;
        }

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FileOutcome::Missing,
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                return FileOutcome::Failed;
            }
        };

        if metadata.len() > self.config.max_file_size {
            debug!(
                "Skipping {} ({} bytes exceeds ceiling)",
                path.display(),
                metadata.len()
            );
            return FileOutcome::TooLarge;
        }

        // captured before the read so a concurrent write is seen next pass
        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(t) => t.into(),
            Err(e) => {
                warn!("No modification time for {}: {}", path.display(), e);
                return FileOutcome::Failed;
            }
        };

        if let Some(existing) = self.store.get(path) {
            if !existing.is_stale(modified) {
                return FileOutcome::Unchanged;
            }
        }

        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return FileOutcome::Missing,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                return FileOutcome::Failed;
            }
        };

        if bytes.iter().take(BINARY_SNIFF_LEN).any(|b| *b == 0) {
            debug!("Skipping binary file {}", path.display());
            return FileOutcome::Binary;
        }

        let content = String::from_utf8_lossy(&bytes).into_owned();
        let doc = IndexedDocument::build(path.to_path_buf(), content, modified);
        debug!(
            "Indexed {} ({} tokens, {} symbols)",
            path.display(),
            doc.token_count,
            doc.symbols.len()
        );
        self.store.upsert(doc);
        FileOutcome::Indexed
    }

    /// Remove documents under `root` that this pass did not keep
    fn prune(&self, root: &Path, kept: &HashSet<PathBuf>) -> usize {
        let mut removed = 0;
        for path in self.store.paths_under(root) {
            if kept.contains(&path) || self.touched.lock().contains(&path) {
                continue;
            }
            if self.store.remove(&path).is_some() {
                debug!("Pruned {}", path.display());
                removed += 1;
            }
        }
        removed
    }

    fn remember_root(&self, root: &Path) {
        let mut roots = self.roots.lock();
        if !roots.iter().any(|r| r == root) {
            roots.push(root.to_path_buf());
        }
    }

    /// Whether a directory between the file and its root is ignored
    ///
    /// Scoped to the deepest known root containing `path`; without one, every
    /// parent directory is checked.
    fn in_ignored_dir(&self, path: &Path) -> bool {
        let parent = path.parent().unwrap_or(path);
        let scoped = self
            .roots
            .lock()
            .iter()
            .filter(|root| parent.starts_with(root))
            .max_by_key(|root| root.components().count())
            .and_then(|root| parent.strip_prefix(root).ok())
            .map(Path::to_path_buf);

        scoped
            .as_deref()
            .unwrap_or(parent)
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .any(|name| self.config.is_ignored_dir(name))
    }

    async fn persist(&self) -> bool {
        match self.store.save(&self.config.storage_path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to persist index: {}", e);
                false
            }
        }
    }

    fn emit(&self, phase: IndexPhase, root: Option<&Path>, files_total: usize, files_done: usize) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(IndexProgress {
                phase,
                root: root.map(Path::to_path_buf),
                files_total,
                files_done,
            });
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
