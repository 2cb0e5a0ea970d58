//! Workspace index and lexical retrieval
//!
//! Key components:
//! - `language` - Language detection by file extension
//! - `extractor` - Heuristic symbol/import/export/comment extraction
//! - `document` - Indexed document model and token estimate
//! - `store` - In-memory document store with a JSON durable copy
//! - `indexer` - Incremental indexing passes over workspace roots
//! - `retrieval` - Scored, token-budgeted search
//! - `formatter` - Renders results into a prompt context block

pub mod document;
pub mod extractor;
pub mod formatter;
pub mod indexer;
pub mod language;
pub mod retrieval;
pub mod store;

pub use document::{estimate_tokens, FileType, IndexedDocument};
pub use extractor::FileMetadata;
pub use formatter::ContextFormatter;
pub use indexer::{FileOutcome, IndexOutcome, IndexPhase, IndexProgress, IndexStats, Indexer};
pub use language::{Language, LanguageFamily};
pub use retrieval::{RelevanceEngine, SearchQuery, SearchResult};
pub use store::{DocumentStore, StoreError};
