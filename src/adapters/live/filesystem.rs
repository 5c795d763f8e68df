//! Live filesystem adapter using `std::fs` and `walkdir`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ports::filesystem::FileSystem;
use crate::ports::PortError;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

impl FileSystem for LiveFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                entries.push(name.to_string());
            }
        }
        entries.sort();
        Ok(entries)
    }

    fn walk_files(&self, root: &Path, skip_dirs: &[String]) -> Result<Vec<PathBuf>, PortError> {
        if !root.is_dir() {
            return Err(format!("not a directory: {}", root.display()).into());
        }
        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !entry.file_name().to_str().is_some_and(|name| skip_dirs.iter().any(|s| s == name))
        });

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(err) => log::warn!("Skipping unreadable entry: {err}"),
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools/graph/backend-graph.json");
        LiveFileSystem.write(&path, "{}").unwrap();
        assert_eq!(LiveFileSystem.read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn walk_skips_named_directories() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        fs.write(&dir.path().join("src/web/App.tsx"), "x").unwrap();
        fs.write(&dir.path().join("src/web/node_modules/react/index.js"), "x").unwrap();
        fs.write(&dir.path().join("a.cs"), "x").unwrap();

        let files = fs.walk_files(dir.path(), &["node_modules".to_string()]).unwrap();
        let relative: Vec<_> =
            files.iter().map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf()).collect();
        assert_eq!(relative, vec![PathBuf::from("a.cs"), PathBuf::from("src/web/App.tsx")]);
    }

    #[test]
    fn list_dir_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LiveFileSystem;
        fs.write(&dir.path().join("b.cs"), "").unwrap();
        fs.write(&dir.path().join("a.cs"), "").unwrap();
        assert_eq!(fs.list_dir(dir.path()).unwrap(), vec!["a.cs", "b.cs"]);
    }
}
