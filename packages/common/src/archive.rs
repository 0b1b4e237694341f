//! # Zip Archives
//!
//! Both export paths hand their output to the caller as a single zip
//! blob. Entries are written in insertion order with forward-slash names.

use crate::{CommonError, CommonResult};
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ZIP_MIME_TYPE: &str = "application/zip";

/// In-memory zip builder
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: BTreeSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: BTreeSet::new(),
        }
    }

    /// Add a file under `name`
    pub fn add_file(&mut self, name: &str, contents: &[u8]) -> CommonResult<()> {
        let name = name.trim_start_matches('/').to_string();
        if !self.names.insert(name.clone()) {
            return Err(CommonError::DuplicateEntry(name));
        }

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        self.writer.start_file(name, options)?;
        self.writer.write_all(contents)?;
        Ok(())
    }

    /// Add a file under a relative path, normalizing separators
    pub fn add_path(&mut self, path: &Path, contents: &[u8]) -> CommonResult<()> {
        self.add_file(&archive_name(path), contents)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Finish the central directory and return the zip bytes
    pub fn finish(self) -> CommonResult<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Downloadable output of an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl BuildArtifact {
    pub fn zip(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: ZIP_MIME_TYPE,
            bytes,
        }
    }
}

/// Zip entry name for a relative path
pub fn archive_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::path::PathBuf;

    #[test]
    fn test_archive_round_trip_contents() {
        let mut builder = ArchiveBuilder::new();
        builder.add_file("index.html", b"<html></html>").unwrap();
        builder
            .add_path(&PathBuf::from("src").join("App.tsx"), b"export default 1")
            .unwrap();
        assert_eq!(builder.len(), 2);

        let bytes = builder.finish().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut html = String::new();
        archive
            .by_name("index.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert_eq!(html, "<html></html>");
        assert!(archive.by_name("src/App.tsx").is_ok());
    }

    #[test]
    fn test_duplicate_entries_rejected() {
        let mut builder = ArchiveBuilder::new();
        builder.add_file("a.txt", b"a").unwrap();
        let err = builder.add_file("/a.txt", b"b").unwrap_err();
        assert!(matches!(err, CommonError::DuplicateEntry(name) if name == "a.txt"));
    }
}
