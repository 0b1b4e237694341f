//! Whole-project patch run

use crate::template::TemplatePatcher;
use crate::PatchError;
use retouch_common::{ArchiveBuilder, BuildArtifact, FileSystem};
use retouch_overrides::ContentSnapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Snapshot file read from the project root
pub const SNAPSHOT_FILE: &str = "overrides-snapshot.json";

/// Archive written to the project root
pub const OUTPUT_ARCHIVE: &str = "patched-project.zip";

/// Dependency caches and build output, never bundled
pub const DEFAULT_EXCLUDES: [&str; 7] = ["node_modules", "target", "dist", "build", ".git", ".next", "out"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchOptions {
    /// Directory names skipped while walking the project
    pub exclude: Vec<String>,
    /// Extensions of files treated as templates
    pub extensions: Vec<String>,
    /// Name of the conditional style helper in templates
    pub style_helper: String,
    /// File name of the output archive, left out of the bundle
    pub archive_name: String,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            extensions: ["js", "jsx", "ts", "tsx"].iter().map(|s| s.to_string()).collect(),
            style_helper: "editableStyle".to_string(),
            archive_name: OUTPUT_ARCHIVE.to_string(),
        }
    }
}

impl PatchOptions {
    fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// A template that was rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct PatchedFile {
    /// Relative to the project root
    pub path: PathBuf,
    pub applied: Vec<String>,
}

#[derive(Debug)]
pub struct ProjectPatch {
    pub patched: Vec<PatchedFile>,
    /// Bundle of the whole project with patched templates substituted
    pub artifact: BuildArtifact,
}

/// Load the snapshot that drives a patch run.
///
/// A missing snapshot is fatal; nothing else is read.
pub fn load_snapshot(fs: &impl FileSystem, path: &Path) -> Result<ContentSnapshot, PatchError> {
    if !fs.exists(path) {
        return Err(PatchError::SnapshotMissing(path.to_path_buf()));
    }
    let json = fs.read_to_string(path)?;
    ContentSnapshot::from_json(&json).map_err(|source| PatchError::InvalidSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Patch every template under `root` and bundle the project.
///
/// Templates that match nothing are bundled unchanged. Any file failing
/// to patch fails the run and no archive is produced.
pub fn patch_project(
    fs: &impl FileSystem,
    root: &Path,
    snapshot: &ContentSnapshot,
    options: &PatchOptions,
) -> Result<ProjectPatch, PatchError> {
    let patcher = TemplatePatcher::new(snapshot, &options.style_helper)?;
    let files = fs.list_files(root, &options.exclude)?;

    let mut archive = ArchiveBuilder::new();
    let mut patched = Vec::new();

    for relative in files {
        if relative == Path::new(&options.archive_name) {
            continue;
        }

        let absolute = root.join(&relative);
        let bytes = fs.read(&absolute)?;

        let patch = if options.is_template(&relative) {
            match std::str::from_utf8(&bytes) {
                Ok(source) => patcher
                    .patch(source)
                    .map_err(|e| e.in_file(&relative))?,
                Err(_) => {
                    debug!(path = %relative.display(), "Template is not UTF-8, copying as is");
                    None
                }
            }
        } else {
            None
        };

        match patch {
            Some(patch) => {
                info!(path = %relative.display(), applied = ?patch.applied, "Patched template");
                archive.add_path(&relative, patch.content.as_bytes())?;
                patched.push(PatchedFile {
                    path: relative,
                    applied: patch.applied,
                });
            }
            None => archive.add_path(&relative, &bytes)?,
        }
    }

    let bundled = archive.len();
    let artifact = BuildArtifact::zip(options.archive_name.clone(), archive.finish()?);
    info!(files = bundled, patched = patched.len(), "Bundled project");

    Ok(ProjectPatch { patched, artifact })
}
