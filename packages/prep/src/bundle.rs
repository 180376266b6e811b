//! Bundling of per-document annotation exports into one flat directory.
//!
//! The annotation tool exports one folder per annotated document, each
//! holding a CAS JSON file with a tool-generated name. Bundling copies that
//! file out of every folder and names it after the folder:
//!
//! ```text
//! article_001/CURATION_USER123.json  ->  jsons/article_001.json
//! some-other-doc/export.json         ->  jsons/some-other-doc.json
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PrepError, Result};

/// Outcome of a bundling run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleReport {
    /// `(source, destination)` pairs, in folder order.
    pub copied: Vec<(PathBuf, PathBuf)>,

    /// Folders without any JSON file.
    pub skipped: Vec<PathBuf>,

    /// Folders holding more than one JSON file; the first by name was used.
    pub ambiguous: Vec<PathBuf>,

    /// Folders whose destination had already been written in this run and
    /// was overwritten, e.g. `doc.v2` and `doc.v3` both bundling to `doc.json`.
    pub overwritten: Vec<PathBuf>,
}

/// Copy the CAS JSON export of every sub-folder of `root` into `output`.
///
/// Hidden folders and the output directory itself are ignored. Folders are
/// visited in name order so repeated runs copy the same files.
pub fn bundle_exports(root: &Path, output: &Path) -> Result<BundleReport> {
    fs::create_dir_all(output).map_err(|e| PrepError::io(output, e))?;
    let output_canonical = fs::canonicalize(output).map_err(|e| PrepError::io(output, e))?;

    let mut report = BundleReport::default();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for folder in sorted_entries(root)? {
        if !folder.is_dir() || is_hidden(&folder) {
            continue;
        }
        if fs::canonicalize(&folder).map_err(|e| PrepError::io(&folder, e))? == output_canonical {
            continue;
        }

        let json_files: Vec<PathBuf> = sorted_entries(&folder)?
            .into_iter()
            .filter(|p| p.is_file() && has_json_extension(p))
            .collect();

        let Some(source) = json_files.first() else {
            tracing::warn!("No JSON file found in {}, skipping", folder.display());
            report.skipped.push(folder);
            continue;
        };

        if json_files.len() > 1 {
            tracing::warn!(
                "Multiple JSON files in {}, using first: {}",
                folder.display(),
                source.display()
            );
            report.ambiguous.push(folder.clone());
        }

        let destination = output.join(bundled_name(&folder));
        if !written.insert(destination.clone()) {
            tracing::warn!(
                "{} overwrites {} from an earlier folder",
                folder.display(),
                destination.display()
            );
            report.overwritten.push(folder.clone());
        }
        fs::copy(source, &destination).map_err(|e| PrepError::io(&destination, e))?;
        tracing::info!("{} -> {}", source.display(), destination.display());

        report.copied.push((source.clone(), destination));
    }

    Ok(report)
}

/// Entries of a directory, sorted by path.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| PrepError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| PrepError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

pub(crate) fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
}

/// `<folder name without extension>.json`
fn bundled_name(folder: &Path) -> String {
    let stem = folder
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_name() {
        assert_eq!(bundled_name(Path::new("exports/article_001")), "article_001.json");
        assert_eq!(bundled_name(Path::new("exports/news_0002.txt")), "news_0002.json");
    }

    #[test]
    fn test_has_json_extension() {
        assert!(has_json_extension(Path::new("a/CURATION_USER.json")));
        assert!(has_json_extension(Path::new("a/EXPORT.JSON")));
        assert!(!has_json_extension(Path::new("a/notes.txt")));
        assert!(!has_json_extension(Path::new("a/json")));
    }

    #[test]
    fn test_bundle_exports() {
        let root = tempdir().unwrap();
        let r = root.path();

        fs::create_dir(r.join("article_001")).unwrap();
        fs::write(r.join("article_001/CURATION_USER123.json"), "{\"a\":1}").unwrap();

        fs::create_dir(r.join("doc.v2")).unwrap();
        fs::write(r.join("doc.v2/b.json"), "{\"b\":2}").unwrap();
        fs::write(r.join("doc.v2/a.json"), "{\"a\":2}").unwrap();

        fs::create_dir(r.join("empty")).unwrap();
        fs::write(r.join("empty/readme.txt"), "nothing").unwrap();

        fs::create_dir(r.join(".git")).unwrap();
        fs::write(r.join(".git/config.json"), "{}").unwrap();

        fs::write(r.join("loose.json"), "{}").unwrap();

        let output = r.join("jsons");
        let report = bundle_exports(r, &output).unwrap();

        assert_eq!(report.copied.len(), 2);
        assert_eq!(report.skipped, vec![r.join("empty")]);
        assert_eq!(report.ambiguous, vec![r.join("doc.v2")]);

        assert_eq!(
            fs::read_to_string(output.join("article_001.json")).unwrap(),
            "{\"a\":1}"
        );
        assert_eq!(fs::read_to_string(output.join("doc.json")).unwrap(), "{\"a\":2}");
        assert!(!output.join(".git.json").exists());
    }

    #[test]
    fn test_bundle_reports_name_collisions() {
        let root = tempdir().unwrap();
        let r = root.path();
        fs::create_dir(r.join("doc.v2")).unwrap();
        fs::write(r.join("doc.v2/export.json"), "{\"v\":2}").unwrap();
        fs::create_dir(r.join("doc.v3")).unwrap();
        fs::write(r.join("doc.v3/export.json"), "{\"v\":3}").unwrap();

        let output = r.join("jsons");
        let report = bundle_exports(r, &output).unwrap();

        assert_eq!(report.copied.len(), 2);
        assert_eq!(report.overwritten, vec![r.join("doc.v3")]);
        assert_eq!(fs::read_to_string(output.join("doc.json")).unwrap(), "{\"v\":3}");
    }

    #[test]
    fn test_bundle_ignores_output_dir_on_rerun() {
        let root = tempdir().unwrap();
        let r = root.path();
        fs::create_dir(r.join("doc")).unwrap();
        fs::write(r.join("doc/x.json"), "{}").unwrap();

        let output = r.join("jsons");
        bundle_exports(r, &output).unwrap();
        let report = bundle_exports(r, &output).unwrap();

        assert_eq!(report.copied.len(), 1);
        assert!(!output.join("jsons.json").exists());
    }

    #[test]
    fn test_bundle_missing_root() {
        let out = tempdir().unwrap();
        let err = bundle_exports(Path::new("/nonexistent/exports"), out.path()).unwrap_err();
        assert!(matches!(err, PrepError::Io { .. }));
    }
}
