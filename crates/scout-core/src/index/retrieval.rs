//! Lexical relevance search over indexed documents
//!
//! Scoring is heuristic: raw term occurrences plus fixed boosts for matches in
//! extracted metadata, divided by document size. Results are then packed
//! greedily, in rank order, into the caller's token budget.

use std::sync::Arc;

use super::document::IndexedDocument;
use super::formatter::ContextFormatter;
use super::store::DocumentStore;

const SYMBOL_BOOST: f64 = 5.0;
const EXPORT_BOOST: f64 = 3.0;
const IMPORT_BOOST: f64 = 2.0;
const COMMENT_BOOST: f64 = 1.5;
const FILE_TYPE_BOOST: f64 = 4.0;

/// Query terms must be longer than this many characters
const MIN_TERM_LEN: usize = 2;

/// Default result cap for plain searches
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Result cap used when assembling context
pub const CONTEXT_MAX_RESULTS: usize = 10;

/// A search query
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Free-text query
    pub text: String,
    /// Maximum ranked candidates considered
    pub limit: usize,
    /// Ceiling on the summed token count of returned documents
    pub max_tokens: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: DEFAULT_MAX_RESULTS,
            max_tokens: usize::MAX,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A ranked document
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub document: Arc<IndexedDocument>,
    /// Non-negative, unbounded; only the ordering is meaningful
    pub relevance_score: f64,
}

/// Lower-cased query terms longer than two characters
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|t| t.chars().count() > MIN_TERM_LEN)
        .map(str::to_string)
        .collect()
}

/// Size-normalized relevance of one document
///
/// `terms` come from [`tokenize_query`]; `query_lower` is the whole lower-cased
/// query, used for the `test` and `react` file type rules.
pub fn score_document(doc: &IndexedDocument, terms: &[String], query_lower: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }

    let content = doc.content.to_lowercase();
    let mut score = 0.0;

    for term in terms {
        score += content.matches(term.as_str()).count() as f64;
        score += SYMBOL_BOOST * count_containing(&doc.symbols, term);
        score += EXPORT_BOOST * count_containing(&doc.exports, term);
        score += IMPORT_BOOST * count_containing(&doc.imports, term);
        score += COMMENT_BOOST * count_containing(&doc.comments, term);
    }

    let file_type = doc.file_type.as_string();
    let type_match = terms.iter().any(|t| file_type.contains(t.as_str()))
        || (query_lower.contains("test") && doc.file_type.is_test())
        || (query_lower.contains("react") && doc.file_type.is_ui_component());
    if type_match {
        score += FILE_TYPE_BOOST;
    }

    score / doc.token_count.max(1) as f64
}

fn count_containing(items: &[String], term: &str) -> f64 {
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(term))
        .count() as f64
}

/// Take up to `limit` ranked candidates whose summed token count fits `max_tokens`
///
/// A candidate that would overflow the remaining budget is skipped and the
/// next one is tried.
fn select_within_budget(
    ranked: Vec<SearchResult>,
    limit: usize,
    max_tokens: usize,
) -> Vec<SearchResult> {
    let mut used = 0usize;
    let mut selected = Vec::new();

    for candidate in ranked.into_iter().take(limit) {
        let cost = candidate.document.token_count;
        match used.checked_add(cost) {
            Some(total) if total <= max_tokens => {
                used = total;
                selected.push(candidate);
            }
            _ => continue,
        }
    }

    selected
}

/// Ranks documents from a store against free-text queries
pub struct RelevanceEngine {
    store: Arc<DocumentStore>,
    formatter: ContextFormatter,
    context_max_results: usize,
}

impl RelevanceEngine {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            formatter: ContextFormatter::new(),
            context_max_results: CONTEXT_MAX_RESULTS,
        }
    }

    pub fn with_formatter(mut self, formatter: ContextFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_context_max_results(mut self, limit: usize) -> Self {
        self.context_max_results = limit;
        self
    }

    /// Score, rank and budget documents for `query`
    ///
    /// Deterministic for a fixed store: ties keep store (path) order.
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
        let terms = tokenize_query(&query.text);
        if terms.is_empty() {
            return Vec::new();
        }
        let query_lower = query.text.to_lowercase();

        let mut ranked: Vec<SearchResult> = self
            .store
            .snapshot()
            .into_iter()
            .filter_map(|document| {
                let relevance_score = score_document(&document, &terms, &query_lower);
                (relevance_score > 0.0).then_some(SearchResult {
                    document,
                    relevance_score,
                })
            })
            .collect();

        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        let selected = select_within_budget(ranked, query.limit, query.max_tokens);
        tracing::debug!(
            "Query {:?} matched {} document(s) within {} tokens",
            query.text,
            selected.len(),
            query.max_tokens
        );
        selected
    }

    /// Formatted context for `query`, or an empty string when nothing matches
    pub fn get_context(&self, query: &str, max_tokens: usize) -> String {
        let results = self.search(
            &SearchQuery::new(query)
                .limit(self.context_max_results)
                .max_tokens(max_tokens),
        );
        if results.is_empty() {
            return String::new();
        }
        self.formatter.format(&results)
    }
}
