use crate::config::Config;
use anyhow::{Context, Result};
use colored::Colorize;
use retouch_common::RealFileSystem;
use retouch_patcher::{load_snapshot, patch_project, PatchedFile, SNAPSHOT_FILE};
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a patch run
#[derive(Debug)]
pub struct PatchSummary {
    pub archive: PathBuf,
    pub patched: Vec<PatchedFile>,
}

/// Bake `overrides-snapshot.json` into the project at `cwd` and write the
/// patched bundle next to it.
pub fn patch(cwd: &Path) -> Result<PatchSummary> {
    let fs = RealFileSystem;

    // Snapshot first: without it nothing is read or written
    let snapshot = load_snapshot(&fs, &cwd.join(SNAPSHOT_FILE))?;
    let config = Config::load(cwd).context("Failed to read retouch.config.json")?;
    let options = config.patch_options();

    println!("🩹 {} {}", "Patching".green().bold(), cwd.display());

    let result = patch_project(&fs, cwd, &snapshot, &options)?;

    for file in &result.patched {
        for category in &file.applied {
            println!("  {} {} → {}", "✓".green(), file.path.display(), category);
        }
    }

    let archive = cwd.join(&result.artifact.file_name);
    write_archive(&archive, &result.artifact.bytes)
        .with_context(|| format!("Failed to write {}", archive.display()))?;
    info!(archive = %archive.display(), bytes = result.artifact.bytes.len(), "Wrote archive");

    if result.patched.is_empty() {
        println!("  {} No templates matched the snapshot", "•".yellow());
    }

    Ok(PatchSummary {
        archive,
        patched: result.patched,
    })
}

/// Write through a sibling temp file so a failed run never leaves a
/// truncated archive behind
fn write_archive(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("zip.tmp");
    let written = std::fs::write(&tmp, bytes).and_then(|()| std::fs::rename(&tmp, path));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}
