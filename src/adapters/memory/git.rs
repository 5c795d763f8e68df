//! Git repository double returning a fixed change list.

use std::path::Path;

use crate::ports::git::GitRepo;
use crate::ports::PortError;

/// Reports the same changed files on every call.
#[derive(Default)]
pub struct StaticGitRepo {
    changed: Vec<String>,
}

impl StaticGitRepo {
    /// Creates a repository whose working tree has `changed` modified.
    #[must_use]
    pub fn new(changed: &[&str]) -> Self {
        Self { changed: changed.iter().map(ToString::to_string).collect() }
    }
}

impl GitRepo for StaticGitRepo {
    fn changed_files(&self, _root: &Path) -> Result<Vec<String>, PortError> {
        Ok(self.changed.clone())
    }
}
