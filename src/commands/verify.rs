//! `koinon-graph verify` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::cli::VerifyArgs;
use crate::config::ToolConfig;
use crate::contracts;
use crate::graph::merge::BASELINE_FILE;
use crate::ports::filesystem::FileSystem;

/// Exit code for a graph that is missing, unreadable or incomplete.
const INPUT_ERROR: u8 = 2;

/// Execute the `verify` command.
///
/// Exits 0 when no check fails, 1 on any FAIL finding and 2 when the
/// graph cannot be loaded. Never returns an error: input problems are
/// reported here so they keep their own exit code.
#[must_use]
pub fn run(args: &VerifyArgs) -> ExitCode {
    let config = match super::load_config(&LiveFileSystem, &args.project_root) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::from(INPUT_ERROR);
        }
    };
    let path = graph_path(&config, &args.project_root, args.graph_path.as_deref());
    ExitCode::from(run_with_fs(&LiveFileSystem, &path))
}

fn graph_path(config: &ToolConfig, root: &Path, explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(|| config.graph_dir(root).join(BASELINE_FILE), Path::to_path_buf)
}

/// Verify the graph at `path`, printing results to stdout, and return the
/// process exit status.
#[must_use]
pub fn run_with_fs(fs: &dyn FileSystem, path: &Path) -> u8 {
    log::info!("Loading graph from {}...", path.display());
    let graph = match contracts::load_baseline(fs, path) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("Error: {err}");
            return INPUT_ERROR;
        }
    };

    let verification = contracts::verify(&graph);
    print!("{}", verification.render());
    u8::from(!verification.passed())
}
