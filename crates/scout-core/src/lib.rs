//! Scout core: local workspace indexing and relevance-ranked context retrieval

pub mod access;
pub mod config;
pub mod index;
pub mod paths;
pub mod service;

pub use access::{AccessFilter, AllowAll, IgnoreFileFilter};
pub use config::RetrievalConfig;
pub use service::{ContextService, ServiceStats};
