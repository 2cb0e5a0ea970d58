//! Context service: the single entry point hosts talk to
//!
//! Owns the document store, the indexer that keeps it current and the
//! relevance engine that answers queries against it.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::access::AccessFilter;
use crate::config::RetrievalConfig;
use crate::index::{
    ContextFormatter, DocumentStore, FileOutcome, IndexOutcome, Indexer, RelevanceEngine,
    SearchQuery, SearchResult,
};

/// Snapshot of what the store currently holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub documents: usize,
    pub total_tokens: usize,
    pub indexing: bool,
}

pub struct ContextService {
    config: RetrievalConfig,
    store: Arc<DocumentStore>,
    indexer: Indexer,
    engine: RelevanceEngine,
}

impl ContextService {
    /// Load the durable store and wire up indexing and retrieval
    ///
    /// An unreadable or corrupt store starts empty; the next pass rebuilds it.
    pub async fn open(config: RetrievalConfig, filter: Arc<dyn AccessFilter>) -> Self {
        let store = Arc::new(DocumentStore::load_or_default(&config.storage_path).await);
        Self::with_store(config, filter, store)
    }

    /// Build a service over an existing store
    pub fn with_store(
        config: RetrievalConfig,
        filter: Arc<dyn AccessFilter>,
        store: Arc<DocumentStore>,
    ) -> Self {
        let indexer = Indexer::new(store.clone(), filter, config.clone());
        let engine = RelevanceEngine::new(store.clone())
            .with_context_max_results(config.context_max_results);
        Self {
            config,
            store,
            indexer,
            engine,
        }
    }

    /// Show paths relative to `roots` in formatted context
    pub fn with_display_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.engine = self
            .engine
            .with_formatter(ContextFormatter::new().with_roots(roots));
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    pub async fn reindex(&self, roots: &[PathBuf]) -> IndexOutcome {
        self.indexer.reindex(roots).await
    }

    /// File created or changed
    pub async fn index_file(&self, path: &Path) -> FileOutcome {
        self.indexer.index_file(path).await
    }

    /// File deleted
    pub async fn remove_file(&self, path: &Path) -> bool {
        self.indexer.remove_file(path).await
    }

    /// Ranked documents for `query`
    ///
    /// `max_results` falls back to the configured default; `max_tokens` to no limit.
    pub fn search(
        &self,
        query: &str,
        max_results: Option<usize>,
        max_tokens: Option<usize>,
    ) -> Vec<SearchResult> {
        let query = SearchQuery::new(query)
            .limit(max_results.unwrap_or(self.config.default_max_results))
            .max_tokens(max_tokens.unwrap_or(usize::MAX));
        self.engine.search(&query)
    }

    /// Formatted context for `query` within `max_tokens`, empty when nothing matches
    pub fn get_relevant_context(&self, query: &str, max_tokens: usize) -> String {
        self.engine.get_context(query, max_tokens)
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            documents: self.store.len(),
            total_tokens: self.store.total_tokens(),
            indexing: self.indexer.is_indexing(),
        }
    }
}
