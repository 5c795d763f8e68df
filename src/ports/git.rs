//! Git repository port for version-control queries.

use std::path::Path;

use super::PortError;

/// Provides read access to a git working tree.
pub trait GitRepo: Send + Sync {
    /// Lists files that are modified, added or renamed in the working tree
    /// or the index, relative to the repository root. Deleted files are
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not inside a repository or git fails.
    fn changed_files(&self, root: &Path) -> Result<Vec<String>, PortError>;
}
