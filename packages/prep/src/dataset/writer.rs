//! Dataset serialization and all-or-nothing output.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PrepError, Result};

/// Serialization format of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON array, 2-space indent.
    Json,
    /// One compact JSON object per line.
    Jsonl,
}

impl Format {
    /// Pick the format from a path's extension; anything but `.jsonl` is JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("jsonl") => Self::Jsonl,
            _ => Self::Json,
        }
    }

    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

/// Render items in the given format. Output always ends with a newline.
pub fn render<T: Serialize>(items: &[T], format: Format) -> serde_json::Result<String> {
    match format {
        Format::Json => {
            let mut content = serde_json::to_string_pretty(items)?;
            content.push('\n');
            Ok(content)
        }
        Format::Jsonl => {
            let mut content = String::new();
            for item in items {
                content.push_str(&serde_json::to_string(item)?);
                content.push('\n');
            }
            Ok(content)
        }
    }
}

/// A rendered file waiting to be committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    /// Render `items` for `path`, choosing the format from its extension.
    pub fn render<T: Serialize>(path: impl Into<PathBuf>, items: &[T]) -> Result<Self> {
        let path = path.into();
        let format = Format::from_path(&path);
        Self::render_as(path, items, format)
    }

    /// Render `items` for `path` in an explicit format.
    pub fn render_as<T: Serialize>(
        path: impl Into<PathBuf>,
        items: &[T],
        format: Format,
    ) -> Result<Self> {
        let path = path.into();
        let contents = render(items, format).map_err(|e| PrepError::json(&path, e))?;
        Ok(Self { path, contents })
    }
}

/// Write all artifacts or none of them.
///
/// Every artifact goes to a hidden temporary sibling first and is synced to
/// disk. Only when all temporaries exist are they renamed into place. If a
/// temporary cannot be written, the ones already written are removed and
/// no final path is touched. Two artifacts for the same path are rejected
/// before anything is staged.
pub fn write_artifacts(artifacts: &[Artifact]) -> Result<()> {
    reject_duplicate_targets(artifacts)?;

    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        match stage(artifact) {
            Ok(temp) => staged.push((temp, artifact.path.as_path())),
            Err(e) => {
                remove_temporaries(&staged);
                return Err(e);
            }
        }
    }

    for (index, (temp, target)) in staged.iter().enumerate() {
        if let Err(e) = commit(temp, target) {
            remove_temporaries(&staged[index..]);
            return Err(e);
        }
        tracing::debug!("Wrote {}", target.display());
    }

    Ok(())
}

/// Fail with `InvalidInput` when two artifacts resolve to the same file.
fn reject_duplicate_targets(artifacts: &[Artifact]) -> Result<()> {
    let mut seen = HashSet::new();
    for artifact in artifacts {
        if !seen.insert(target_key(&artifact.path)) {
            return Err(PrepError::InvalidInput(format!(
                "output {} is given more than once",
                artifact.path.display()
            )));
        }
    }
    Ok(())
}

/// Comparable form of an output path: the canonical parent directory when
/// it exists, joined with the file name.
fn target_key(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
    match path.file_name() {
        Some(name) => parent.join(name),
        None => path.to_path_buf(),
    }
}

fn commit(temp: &Path, target: &Path) -> Result<()> {
    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if target.exists() {
        fs::remove_file(target).map_err(|e| PrepError::io(target, e))?;
    }

    fs::rename(temp, target).map_err(|e| PrepError::io(target, e))
}

fn remove_temporaries(staged: &[(PathBuf, &Path)]) {
    for (temp, _) in staged {
        if let Err(cleanup) = fs::remove_file(temp) {
            tracing::warn!("Could not remove {}: {cleanup}", temp.display());
        }
    }
}

/// Write an artifact to its temporary path and return that path.
fn stage(artifact: &Artifact) -> Result<PathBuf> {
    let target = &artifact.path;
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| PrepError::io(&dir, e))?;

    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PrepError::InvalidInput(format!("not a file path: {}", target.display())))?;
    let temp = dir.join(format!(".{file_name}.tmp"));

    let mut file = File::create(&temp).map_err(|e| PrepError::io(&temp, e))?;
    file.write_all(artifact.contents.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| PrepError::io(&temp, e))?;

    Ok(temp)
}
