//! Report discovery and loading.
//!
//! Reports are plain text files named `<old>_to_<new>.txt` (full) or
//! `<old>_to_<new>-slim.txt` (slim). Loading sits behind [`ReportSource`] so
//! the pipeline can be fed from disk, memory or anything else the caller
//! supplies.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, warn};
use trend_core::error::{Result, TrendError};
use trend_core::models::RawReport;

const REPORT_EXTENSION: &str = "txt";
const SLIM_SUFFIX: &str = "-slim";
const PAIR_SEPARATOR: &str = "_to_";

// ── Public types ──────────────────────────────────────────────────────────────

/// Anything that can hand over a batch of raw reports.
pub trait ReportSource {
    fn load(&self) -> Result<Vec<RawReport>>;
}

impl ReportSource for Vec<RawReport> {
    fn load(&self) -> Result<Vec<RawReport>> {
        Ok(self.clone())
    }
}

/// Full or slim report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Full,
    Slim,
}

/// Which file to read when a version pair has both a full and a slim report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportVariant {
    Full,
    Slim,
    /// Prefer the full report, fall back to the slim one.
    #[default]
    Auto,
}

impl FromStr for ReportVariant {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "slim" => Ok(Self::Slim),
            "auto" => Ok(Self::Auto),
            other => Err(TrendError::Config(format!("unknown report variant: {other}"))),
        }
    }
}

/// Version pair and kind decoded from a report file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportName {
    pub old: String,
    pub new: String,
    pub kind: ReportKind,
}

/// Reads reports from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    variant: ReportVariant,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>, variant: ReportVariant) -> Self {
        Self {
            dir: dir.into(),
            variant,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Report files selected for loading, one per version pair.
    pub fn select_files(&self) -> Vec<PathBuf> {
        let mut pairs: BTreeMap<(String, String), (Option<PathBuf>, Option<PathBuf>)> =
            BTreeMap::new();
        for path in find_report_files(&self.dir) {
            let Some(name) = report_name(&path) else {
                debug!("Ignoring {}: not an <old>_to_<new> report", path.display());
                continue;
            };
            let entry = pairs.entry((name.old, name.new)).or_default();
            match name.kind {
                ReportKind::Full => entry.0 = Some(path),
                ReportKind::Slim => entry.1 = Some(path),
            }
        }

        pairs
            .into_values()
            .filter_map(|(full, slim)| match self.variant {
                ReportVariant::Full => full,
                ReportVariant::Slim => slim,
                ReportVariant::Auto => full.or(slim),
            })
            .collect()
    }
}

impl ReportSource for DirectorySource {
    fn load(&self) -> Result<Vec<RawReport>> {
        if !self.dir.is_dir() {
            return Err(TrendError::ReportsDirNotFound(self.dir.clone()));
        }

        let files = self.select_files();
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            let Some(name) = report_name(&path) else {
                continue;
            };
            match std::fs::read(&path) {
                Ok(bytes) => {
                    let text = match String::from_utf8(bytes) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("{} is not valid UTF-8, decoding lossily", path.display());
                            String::from_utf8_lossy(e.as_bytes()).into_owned()
                        }
                    };
                    reports.push(RawReport::new(text, name.old, name.new).with_source(path));
                }
                Err(e) => warn!("Failed to read file {}: {}", path.display(), e),
            }
        }

        debug!(
            "Loaded {} reports from {}",
            reports.len(),
            self.dir.display()
        );
        Ok(reports)
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Find all `.txt` files recursively under `dir`, sorted by path.
pub fn find_report_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        warn!("Reports path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == REPORT_EXTENSION)
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Decode `<old>_to_<new>[-slim].txt`.
pub fn report_name(path: &Path) -> Option<ReportName> {
    if path.extension()? != REPORT_EXTENSION {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (pair, kind) = match stem.strip_suffix(SLIM_SUFFIX) {
        Some(pair) => (pair, ReportKind::Slim),
        None => (stem, ReportKind::Full),
    };
    let (old, new) = pair.split_once(PAIR_SEPARATOR)?;
    if old.is_empty() || new.is_empty() {
        return None;
    }
    Some(ReportName {
        old: old.to_string(),
        new: new.to_string(),
        kind,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    // ── report_name ───────────────────────────────────────────────────────────

    #[test]
    fn test_report_name_full() {
        let name = report_name(Path::new("docs/1.0.0_to_1.0.1.txt")).unwrap();
        assert_eq!(name.old, "1.0.0");
        assert_eq!(name.new, "1.0.1");
        assert_eq!(name.kind, ReportKind::Full);
    }

    #[test]
    fn test_report_name_slim() {
        let name = report_name(Path::new("v2.0.0_to_v2.1.0-slim.txt")).unwrap();
        assert_eq!(name.old, "v2.0.0");
        assert_eq!(name.new, "v2.1.0");
        assert_eq!(name.kind, ReportKind::Slim);
    }

    #[test]
    fn test_report_name_rejects_other_files() {
        assert!(report_name(Path::new("notes.txt")).is_none());
        assert!(report_name(Path::new("1.0.0_to_.txt")).is_none());
        assert!(report_name(Path::new("1.0.0_to_1.0.1.md")).is_none());
    }

    // ── find_report_files ─────────────────────────────────────────────────────

    #[test]
    fn test_find_report_files_recursive_sorted() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("older");
        std::fs::create_dir_all(&sub).unwrap();
        write(dir.path(), "b_to_c.txt", "");
        write(dir.path(), "a_to_b.txt", "");
        write(&sub, "0_to_a.txt", "");
        write(dir.path(), "chart.html", "");

        let files = find_report_files(dir.path());
        assert_eq!(files.len(), 3);
        assert_eq!(names(&files)[..2], ["a_to_b.txt".to_string(), "b_to_c.txt".to_string()]);
    }

    #[test]
    fn test_find_report_files_nonexistent_path() {
        let files = find_report_files(Path::new("/tmp/does-not-exist-apk-trend-xyz"));
        assert!(files.is_empty());
    }

    // ── DirectorySource ───────────────────────────────────────────────────────

    fn populated_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "1.0.0_to_1.0.1.txt", "full a");
        write(dir.path(), "1.0.0_to_1.0.1-slim.txt", "slim a");
        write(dir.path(), "1.0.1_to_1.0.2-slim.txt", "slim b");
        write(dir.path(), "1.0.2_to_1.0.3.txt", "full c");
        write(dir.path(), "README.txt", "not a report");
        dir
    }

    #[test]
    fn test_select_auto_prefers_full() {
        let dir = populated_dir();
        let files = DirectorySource::new(dir.path(), ReportVariant::Auto).select_files();
        assert_eq!(
            names(&files),
            vec!["1.0.0_to_1.0.1.txt", "1.0.1_to_1.0.2-slim.txt", "1.0.2_to_1.0.3.txt"]
        );
    }

    #[test]
    fn test_select_slim_only() {
        let dir = populated_dir();
        let files = DirectorySource::new(dir.path(), ReportVariant::Slim).select_files();
        assert_eq!(
            names(&files),
            vec!["1.0.0_to_1.0.1-slim.txt", "1.0.1_to_1.0.2-slim.txt"]
        );
    }

    #[test]
    fn test_select_full_only() {
        let dir = populated_dir();
        let files = DirectorySource::new(dir.path(), ReportVariant::Full).select_files();
        assert_eq!(names(&files), vec!["1.0.0_to_1.0.1.txt", "1.0.2_to_1.0.3.txt"]);
    }

    #[test]
    fn test_load_reads_text_and_labels() {
        let dir = populated_dir();
        let reports = DirectorySource::new(dir.path(), ReportVariant::Auto)
            .load()
            .unwrap();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].text, "full a");
        assert_eq!(reports[0].old_label, "1.0.0");
        assert_eq!(reports[0].new_label, "1.0.1");
        assert_eq!(
            reports[1].source.as_deref(),
            Some(dir.path().join("1.0.1_to_1.0.2-slim.txt").as_path())
        );
    }

    #[test]
    fn test_load_invalid_utf8_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let mut body = b"Diffuse Comparison: 1.0.0 \xe2\x86\x92 1.0.1\n".to_vec();
        body.extend_from_slice(b"stray \xff byte\n");
        std::fs::write(dir.path().join("1.0.0_to_1.0.1.txt"), body).unwrap();

        let reports = DirectorySource::new(dir.path(), ReportVariant::Auto)
            .load()
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].text.starts_with("Diffuse Comparison: 1.0.0 → 1.0.1\n"));
        assert!(reports[0].text.contains("stray \u{FFFD} byte"));
    }

    #[test]
    fn test_load_missing_dir() {
        let source = DirectorySource::new("/tmp/does-not-exist-apk-trend-xyz", ReportVariant::Auto);
        assert!(matches!(source.load(), Err(TrendError::ReportsDirNotFound(_))));
    }

    #[test]
    fn test_load_empty_dir() {
        let dir = TempDir::new().unwrap();
        let reports = DirectorySource::new(dir.path(), ReportVariant::Auto)
            .load()
            .unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_in_memory_source() {
        let source = vec![RawReport::new("text", "a", "b")];
        assert_eq!(source.load().unwrap(), source);
    }

    // ── ReportVariant ─────────────────────────────────────────────────────────

    #[test]
    fn test_variant_from_str() {
        assert_eq!("full".parse::<ReportVariant>().unwrap(), ReportVariant::Full);
        assert_eq!("SLIM".parse::<ReportVariant>().unwrap(), ReportVariant::Slim);
        assert_eq!("auto".parse::<ReportVariant>().unwrap(), ReportVariant::Auto);
        assert!("tiny".parse::<ReportVariant>().is_err());
    }
}
