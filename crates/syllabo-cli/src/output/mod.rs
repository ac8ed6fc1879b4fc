//! Output helpers

pub mod terminal;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use syllabo_core::EncodedArtifact;

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Decode an artifact and write it to `path`, or to its own file name in `dir`
pub fn write_artifact(
    artifact: &EncodedArtifact,
    path: Option<&Path>,
    dir: &Path,
) -> Result<(PathBuf, usize)> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => dir.join(&artifact.file_name),
    };
    let bytes = artifact.decode()?;
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&target, &bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok((target, bytes.len()))
}

/// JSON report of a written artifact
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenArtifact<'a> {
    pub file_name: &'a str,
    pub mime_type: &'a str,
    pub path: String,
    pub bytes: usize,
}

impl<'a> WrittenArtifact<'a> {
    pub fn new(artifact: &'a EncodedArtifact, path: &Path, bytes: usize) -> Self {
        Self {
            file_name: &artifact.file_name,
            mime_type: &artifact.mime_type,
            path: path.display().to_string(),
            bytes,
        }
    }
}
