//! `koinon-graph rag` commands.

use std::path::Path;
use std::process::ExitCode;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::cli::RagCommand;
use crate::config::RagConfig;
use crate::context::ServiceContext;
use crate::error::{GraphError, Result};
use crate::rag::{index, query, validators};

/// Exit code when validators find violations.
const VIOLATIONS: u8 = 2;

/// Execute a `rag` subcommand against the live services.
///
/// # Errors
///
/// Returns [`GraphError::Remote`] when the embedding service or vector
/// store fails, or [`GraphError::Usage`] if the async runtime cannot start.
pub fn run(command: &RagCommand) -> Result<ExitCode> {
    let root = match command {
        RagCommand::Index(args) | RagCommand::Reindex(args) | RagCommand::Validate(args) => {
            &args.project_root
        }
        RagCommand::Query { common, .. } => &common.project_root,
    };
    let config = super::load_config(&LiveFileSystem, root)?;
    let ctx = ServiceContext::live(&config.rag);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| GraphError::Usage(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(run_with_context(&ctx, &config.rag, root, command))
}

/// Run `command` with the given services.
///
/// # Errors
///
/// See [`run`].
pub async fn run_with_context(
    ctx: &ServiceContext,
    rag: &RagConfig,
    root: &Path,
    command: &RagCommand,
) -> Result<ExitCode> {
    match command {
        RagCommand::Index(_) => {
            log::info!("Using {} ({} dimensions), collection '{}'", rag.embed_model, rag.vector_size, rag.collection);
            let stats = index::index_project(ctx, root, rag).await?;
            println!("Indexed {} files ({} chunks) into '{}'", stats.files, stats.chunks, rag.collection);
            Ok(ExitCode::SUCCESS)
        }
        RagCommand::Reindex(_) => {
            let stats = index::reindex_changed(ctx, root, rag).await?;
            println!("Reindexed {} files ({} chunks)", stats.files, stats.chunks);
            Ok(ExitCode::SUCCESS)
        }
        RagCommand::Query { text, limit, .. } => {
            let text = text.join(" ");
            let hits = query::query(ctx, &text, *limit).await?;
            print!("{}", query::format_hits(&text, &hits));
            Ok(ExitCode::SUCCESS)
        }
        RagCommand::Validate(_) => {
            let code = validate(ctx, rag, root).await?;
            Ok(ExitCode::from(code))
        }
    }
}

/// Reindexes changed files, then runs every validator. Returns 0 when
/// clean and 2 when violations were found.
async fn validate(ctx: &ServiceContext, rag: &RagConfig, root: &Path) -> Result<u8> {
    println!("{}\nRAG SEMANTIC VALIDATION\n{}", "=".repeat(60), "=".repeat(60));
    if let Err(err) = index::reindex_changed(ctx, root, rag).await {
        log::warn!("Reindexing failed: {err}");
        log::warn!("Continuing with existing index...");
    }

    let violations = validators::run_all(ctx).await?;
    print!("{}", validators::format_report(&violations));
    Ok(if violations.is_empty() { 0 } else { VIOLATIONS })
}
