//! Filesystem held in a sorted map of path to contents.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::poisoned;
use crate::ports::filesystem::FileSystem;
use crate::ports::PortError;

/// In-memory filesystem. Directories exist implicitly when a file lives below them.
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, replacing any previous contents. Returns `self` for chaining.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), contents.to_string());
        }
        self
    }

    /// Returns the contents of `path`, if present.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files.lock().ok()?.get(path).cloned()
    }

    fn is_dir(files: &BTreeMap<PathBuf, String>, path: &Path) -> bool {
        files.keys().any(|file| file != path && file.starts_with(path))
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        let files = self.files.lock().map_err(poisoned)?;
        files.get(path).cloned().ok_or_else(|| format!("no such file: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let mut files = self.files.lock().map_err(poisoned)?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().is_ok_and(|files| files.contains_key(path) || Self::is_dir(&files, path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let files = self.files.lock().map_err(poisoned)?;
        if !Self::is_dir(&files, path) {
            return Err(format!("not a directory: {}", path.display()).into());
        }
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.dedup();
        Ok(names)
    }

    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError> {
        let files = self.files.lock().map_err(poisoned)?;
        if !Self::is_dir(&files, root) {
            return Err(format!("not a directory: {}", root.display()).into());
        }
        Ok(files
            .keys()
            .filter(|file| {
                file.strip_prefix(root).is_ok_and(|rest| {
                    let dirs = rest.parent().map(Path::components).into_iter().flatten();
                    !dirs.into_iter().any(|c| skip_dirs.iter().any(|s| c.as_os_str() == s.as_str()))
                })
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file("/p/src/Koinon.Domain/Entities/Person.cs", "a")
            .with_file("/p/src/Koinon.Domain/Entities/Group.cs", "b")
            .with_file("/p/src/web/node_modules/x.js", "c")
    }

    #[test]
    fn directories_exist_implicitly() {
        let fs = tree();
        assert!(fs.exists(Path::new("/p/src")));
        assert!(!fs.exists(Path::new("/p/tools")));
        assert_eq!(
            fs.list_dir(Path::new("/p/src/Koinon.Domain/Entities")).unwrap(),
            vec!["Group.cs", "Person.cs"]
        );
    }

    #[test]
    fn walk_skips_excluded_directories() {
        let files = tree().walk_files(Path::new("/p"), &["node_modules".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn write_then_read() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/out/graph.json"), "{}").unwrap();
        assert_eq!(fs.read_to_string(Path::new("/out/graph.json")).unwrap(), "{}");
        assert!(fs.read_to_string(Path::new("/out/missing.json")).is_err());
    }
}
