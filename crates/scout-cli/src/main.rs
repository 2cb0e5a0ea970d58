//! Scout CLI: index a workspace and pull relevant code context

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scout_core::index::{IndexOutcome, SearchResult};
use scout_core::{ContextService, IgnoreFileFilter, RetrievalConfig};

/// Used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "scout=info,scout_core=info";

/// Local workspace indexing and token-budgeted context retrieval
#[derive(Parser)]
#[command(name = "scout", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (default: ~/.scout/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the document store location
    #[arg(long)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index one or more workspace roots
    Index {
        #[arg(required = true)]
        roots: Vec<PathBuf>,
    },

    /// Rank indexed documents against a query
    Search {
        query: String,
        #[arg(long)]
        max_results: Option<usize>,
        #[arg(long)]
        max_tokens: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print formatted context for a query
    Context {
        query: String,
        #[arg(long, default_value_t = 4000)]
        max_tokens: usize,
        /// Show paths relative to these roots
        #[arg(long = "root")]
        roots: Vec<PathBuf>,
    },

    /// Show what the store holds
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit<'a> {
    path: &'a Path,
    relevance_score: f64,
    token_count: usize,
    file_type: String,
}

impl<'a> From<&'a SearchResult> for SearchHit<'a> {
    fn from(result: &'a SearchResult) -> Self {
        Self {
            path: &result.document.path,
            relevance_score: result.relevance_score,
            token_count: result.document.token_count,
            file_type: result.document.file_type.as_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => RetrievalConfig::load(path)?,
        None => RetrievalConfig::load_or_default()?,
    };
    if let Some(store) = cli.store {
        config = config.with_storage_path(store);
    }

    match cli.command {
        Commands::Index { roots } => cmd_index(config, roots).await,
        Commands::Search {
            query,
            max_results,
            max_tokens,
            json,
        } => cmd_search(config, &query, max_results, max_tokens, json).await,
        Commands::Context {
            query,
            max_tokens,
            roots,
        } => cmd_context(config, &query, max_tokens, roots).await,
        Commands::Stats { json } => cmd_stats(config, json).await,
    }
}

async fn open(config: RetrievalConfig, roots: &[PathBuf]) -> ContextService {
    let filter = IgnoreFileFilter::new(roots, &config.ignore_file_name);
    ContextService::open(config, Arc::new(filter)).await
}

/// Resolve roots against the working directory; stored paths are absolute
fn absolute_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    roots
        .into_iter()
        .map(|root| std::path::absolute(&root).unwrap_or(root))
        .collect()
}

async fn cmd_index(config: RetrievalConfig, roots: Vec<PathBuf>) -> Result<()> {
    let roots = absolute_roots(roots);
    let service = open(config, &roots).await;

    info!("Indexing {} root(s)", roots.len());
    match service.reindex(&roots).await {
        IndexOutcome::Completed(stats) => {
            println!("{}", stats);
            if !stats.persisted {
                anyhow::bail!(
                    "index could not be written to {}",
                    service.config().storage_path.display()
                );
            }
        }
        IndexOutcome::AlreadyRunning => println!("An indexing pass is already running"),
    }
    Ok(())
}

async fn cmd_search(
    config: RetrievalConfig,
    query: &str,
    max_results: Option<usize>,
    max_tokens: Option<usize>,
    json: bool,
) -> Result<()> {
    let service = open(config, &[]).await;
    let results = service.search(query, max_results, max_tokens);

    if json {
        let hits: Vec<SearchHit> = results.iter().map(SearchHit::from).collect();
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No matches for {:?}", query);
    }
    for result in &results {
        println!(
            "{:>10.4}  {:>6} tok  {}",
            result.relevance_score,
            result.document.token_count,
            result.document.path.display()
        );
    }
    Ok(())
}

async fn cmd_context(
    config: RetrievalConfig,
    query: &str,
    max_tokens: usize,
    roots: Vec<PathBuf>,
) -> Result<()> {
    let service = open(config, &[])
        .await
        .with_display_roots(absolute_roots(roots));
    let context = service.get_relevant_context(query, max_tokens);
    std::io::stdout().write_all(context.as_bytes())?;
    Ok(())
}

async fn cmd_stats(config: RetrievalConfig, json: bool) -> Result<()> {
    let service = open(config, &[]).await;
    let stats = service.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "{} documents, {} tokens ({})",
            stats.documents,
            stats.total_tokens,
            service.config().storage_path.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_flags() {
        let cli = Cli::try_parse_from([
            "scout",
            "--store",
            "/tmp/idx.json",
            "search",
            "auth flow",
            "--max-results",
            "3",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/idx.json")));
        match cli.command {
            Commands::Search {
                query,
                max_results,
                max_tokens,
                json,
            } => {
                assert_eq!(query, "auth flow");
                assert_eq!(max_results, Some(3));
                assert_eq!(max_tokens, None);
                assert!(json);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_index_requires_root() {
        assert!(Cli::try_parse_from(["scout", "index"]).is_err());
    }

    #[test]
    fn test_relative_roots_are_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let roots = absolute_roots(vec![PathBuf::from("."), PathBuf::from("/abs/ws")]);
        assert!(roots.iter().all(|r| r.is_absolute()));
        assert!(roots[0].starts_with(&cwd));
        assert_eq!(roots[1], PathBuf::from("/abs/ws"));
    }

    #[tokio::test]
    async fn test_index_and_stats_commands() {
        let workspace = tempfile::tempdir().unwrap();
        let state = tempfile::tempdir().unwrap();
        std::fs::write(workspace.path().join("main.rs"), "fn main() {}").unwrap();
        let config =
            RetrievalConfig::default().with_storage_path(state.path().join("index.json"));

        cmd_index(config.clone(), vec![workspace.path().to_path_buf()])
            .await
            .unwrap();

        let service = open(config, &[]).await;
        assert_eq!(service.stats().documents, 1);
    }
}
