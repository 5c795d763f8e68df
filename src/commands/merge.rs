//! `koinon-graph merge` command.

use std::path::Path;
use std::process::ExitCode;

use crate::cli::MergeArgs;
use crate::config::ToolConfig;
use crate::context::GraphContext;
use crate::error::Result;
use crate::graph::merge::{self, BASELINE_FILE};
use crate::graph::save_json;

/// Execute the `merge` command against the live filesystem.
///
/// # Errors
///
/// Returns [`GraphError::MissingInput`](crate::error::GraphError::MissingInput)
/// or `MalformedInput` when a source graph cannot be loaded, and
/// `Write` when the merged graph cannot be saved.
pub fn run(args: &MergeArgs) -> Result<ExitCode> {
    let ctx = GraphContext::live();
    let config = super::load_config(ctx.fs.as_ref(), &args.project_root)?;
    run_with_context(&ctx, &config, &args.project_root, args.output.as_deref())
}

/// Load, detect, merge and save, printing the drift report before saving.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_context(
    ctx: &GraphContext,
    config: &ToolConfig,
    root: &Path,
    output: Option<&Path>,
) -> Result<ExitCode> {
    let graph_dir = config.graph_dir(root);
    log::info!("Loading graphs from {}...", graph_dir.display());
    let (backend, frontend) = merge::load_graphs(ctx.fs.as_ref(), &graph_dir)?;

    log::info!("Detecting inconsistencies...");
    let report = merge::detect(&backend, &frontend);
    print!("{}", merge::format_report(&report));

    log::info!("Merging graphs...");
    let merged = merge::merge(backend, frontend, ctx.clock.as_ref());

    let output = output.map_or_else(|| graph_dir.join(BASELINE_FILE), |path| root.join(path));
    save_json(ctx.fs.as_ref(), &output, &merged)?;
    println!("{}", merge::format_summary(&merged, &output));
    Ok(ExitCode::SUCCESS)
}
