//! Live git adapter using `git` CLI commands.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

use crate::ports::git::GitRepo;
use crate::ports::PortError;

/// Live git adapter that shells out to the `git` CLI.
pub struct LiveGitRepo;

fn diff_names(root: &Path, extra: Option<&str>) -> Result<Vec<String>, PortError> {
    let mut command = Command::new("git");
    command.current_dir(root).args(["diff", "--name-only", "--diff-filter=MAR"]);
    if let Some(flag) = extra {
        command.arg(flag);
    }
    let output = command.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("git diff --name-only failed: {stderr}").into());
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

impl GitRepo for LiveGitRepo {
    fn changed_files(&self, root: &Path) -> Result<Vec<String>, PortError> {
        let mut files: BTreeSet<String> = diff_names(root, None)?.into_iter().collect();
        files.extend(diff_names(root, Some("--cached"))?);
        Ok(files.into_iter().collect())
    }
}
