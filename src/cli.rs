//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI parser for `koinon-graph`.
#[derive(Debug, Parser)]
#[command(
    name = "koinon-graph",
    version,
    about = "Architecture graph extraction, drift detection and contract checks"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the backend graph from the C# sources.
    Backend(BackendArgs),
    /// Merge backend and frontend graphs and report drift.
    Merge(MergeArgs),
    /// Check API contract conventions against a merged graph.
    Verify(VerifyArgs),
    /// Maintain and query the semantic code index.
    #[command(subcommand)]
    Rag(RagCommand),
}

/// Arguments for `backend`.
#[derive(Debug, Args)]
pub struct BackendArgs {
    /// Output file, relative to the project root unless absolute.
    #[arg(long, default_value = "tools/graph/backend-graph.json")]
    pub output: PathBuf,
    /// Project root containing `src/`.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

/// Arguments for `merge`.
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Output file. Defaults to `graph-baseline.json` in the graph directory.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Project root holding the configuration and graph directory.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

/// Arguments for `verify`.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Merged graph to check. Defaults to `graph-baseline.json` in the graph directory.
    pub graph_path: Option<PathBuf>,
    /// Project root holding the configuration and graph directory.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}

/// `rag` subcommands.
#[derive(Debug, Subcommand)]
pub enum RagCommand {
    /// Rebuild the whole index.
    Index(RagArgs),
    /// Re-index files changed in the git working tree.
    Reindex(RagArgs),
    /// Search the index with a natural-language question.
    Query {
        /// Question words, joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Number of hits to show.
        #[arg(long, default_value_t = crate::rag::query::DEFAULT_LIMIT)]
        limit: usize,
        /// Shared options.
        #[command(flatten)]
        common: RagArgs,
    },
    /// Re-index changed files, then run the semantic validators.
    Validate(RagArgs),
}

/// Arguments shared by the `rag` subcommands.
#[derive(Debug, Args)]
pub struct RagArgs {
    /// Project root to index.
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,
}
