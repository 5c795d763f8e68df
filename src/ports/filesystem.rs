//! Filesystem port for file I/O operations.

use std::path::{Path, PathBuf};

use super::PortError;

/// Provides filesystem access for reading and writing files.
///
/// Collectors, the merger and the indexer only touch the disk through this
/// trait, so every stage can run against an in-memory tree in tests.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String, PortError>;

    /// Writes the given contents to a file, creating parent directories and
    /// overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Lists the entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError>;

    /// Lists every file below `root` (recursively), sorted by path.
    ///
    /// Directories whose name is in `skip_dirs` are not descended into.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` cannot be traversed.
    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError>;
}
