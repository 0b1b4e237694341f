use crate::{CommonError, CommonResult};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File system abstraction for project walking and testing
pub trait FileSystem {
    /// Check if a file exists
    fn exists(&self, path: &Path) -> bool;

    /// Read a file's raw bytes
    fn read(&self, path: &Path) -> CommonResult<Vec<u8>>;

    /// Read a file as UTF-8 text
    fn read_to_string(&self, path: &Path) -> CommonResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes)
            .map_err(|e| CommonError::Generic(format!("{}: {}", path.display(), e)))
    }

    /// List every file under `root`, relative to it and sorted.
    ///
    /// Directories whose name appears in `exclude` are not descended into.
    fn list_files(&self, root: &Path, exclude: &[String]) -> CommonResult<Vec<PathBuf>>;
}

/// Real file system implementation
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> CommonResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CommonError::NotFound(path.to_path_buf()),
            _ => CommonError::Io(e),
        })
    }

    fn list_files(&self, root: &Path, exclude: &[String]) -> CommonResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_excluded(entry.file_name().to_string_lossy().as_ref(), exclude)
            });

        for entry in walker {
            let entry = entry.map_err(|e| CommonError::Generic(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Mock file system for testing
#[derive(Debug, Default)]
pub struct MockFileSystem {
    pub files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> CommonResult<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CommonError::NotFound(path.to_path_buf()))
    }

    fn list_files(&self, root: &Path, exclude: &[String]) -> CommonResult<Vec<PathBuf>> {
        let files = self
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok())
            .filter(|relative| {
                // Every component but the file name is a directory
                let mut dirs: Vec<Component> = relative.components().collect();
                dirs.pop();
                !dirs
                    .iter()
                    .any(|c| is_excluded(c.as_os_str().to_string_lossy().as_ref(), exclude))
            })
            .map(Path::to_path_buf)
            .collect();

        Ok(files)
    }
}

fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude.iter().any(|e| e == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded() -> Vec<String> {
        vec!["node_modules".to_string(), "dist".to_string()]
    }

    #[test]
    fn test_mock_lists_relative_and_skips_excluded() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/project/src/App.tsx", "app");
        fs.add_file("/project/node_modules/react/index.js", "react");
        fs.add_file("/project/dist/bundle.js", "bundle");
        fs.add_file("/project/package.json", "{}");
        fs.add_file("/elsewhere/file.txt", "x");

        let files = fs.list_files(Path::new("/project"), &excluded()).unwrap();

        assert_eq!(
            files,
            vec![PathBuf::from("package.json"), PathBuf::from("src/App.tsx")]
        );
    }

    #[test]
    fn test_mock_read_missing_file() {
        let fs = MockFileSystem::new();
        let err = fs.read(Path::new("missing.json")).unwrap_err();
        assert!(matches!(err, CommonError::NotFound(_)));
    }

    #[test]
    fn test_real_file_system_walk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/pages")).unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::write(dir.path().join("src/pages/Home.jsx"), "home").unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "pkg").unwrap();
        std::fs::write(dir.path().join("README.md"), "readme").unwrap();

        let fs = RealFileSystem;
        let files = fs.list_files(dir.path(), &excluded()).unwrap();

        assert_eq!(
            files,
            vec![PathBuf::from("README.md"), PathBuf::from("src/pages/Home.jsx")]
        );
        assert_eq!(
            fs.read_to_string(&dir.path().join("README.md")).unwrap(),
            "readme"
        );
    }
}
