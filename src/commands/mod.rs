//! Command dispatch and handlers.

pub mod backend;
pub mod merge;
pub mod rag;
pub mod verify;

use std::path::Path;
use std::process::ExitCode;

use crate::cli::Command;
use crate::config::ToolConfig;
use crate::error::Result;
use crate::ports::filesystem::FileSystem;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns the handler's error; the caller maps it to an exit code.
pub fn dispatch(command: &Command) -> Result<ExitCode> {
    match command {
        Command::Backend(args) => backend::run(args),
        Command::Merge(args) => merge::run(args),
        Command::Verify(args) => Ok(verify::run(args)),
        Command::Rag(command) => rag::run(command),
    }
}

/// Loads `<root>/.env` if present, then the tool configuration with
/// `KOINON_*` environment overrides applied.
pub(crate) fn load_config(fs: &dyn FileSystem, root: &Path) -> Result<ToolConfig> {
    dotenvy::from_path(root.join(".env")).ok();
    let mut config = ToolConfig::load(fs, root)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}
