//! Slim report derivation.
//!
//! A slim report is the full report cut just before the DEX detail banner,
//! keeping the summary tables and manifest comparison while dropping the
//! (large) per-class listing.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use trend_core::error::{Result, TrendError};

use crate::reader::{report_name, ReportKind};

/// Banner line that opens the DEX detail section.
const DEX_BANNER: &str = "====   DEX   ====";

/// Cut `full` just before the DEX detail banner line.
///
/// Everything above the banner, including the `====` rule drawn over it, is
/// kept. Text without the banner comes back unchanged.
pub fn slim_report(full: &str) -> String {
    let lines: Vec<&str> = full.split('\n').collect();
    match lines
        .iter()
        .position(|line| line.trim().starts_with(DEX_BANNER))
    {
        Some(banner) => lines[..banner].join("\n"),
        None => full.to_string(),
    }
}

/// Write a `-slim.txt` sibling for every full report in `dir` that lacks one.
///
/// Returns the paths written, sorted.
pub fn write_slim_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TrendError::ReportsDirNotFound(dir.to_path_buf()));
    }

    let mut written = Vec::new();
    for path in crate::reader::find_report_files(dir) {
        let Some(name) = report_name(&path) else {
            continue;
        };
        if name.kind != ReportKind::Full {
            continue;
        }
        let slim_path = path.with_file_name(format!("{}_to_{}-slim.txt", name.old, name.new));
        if slim_path.exists() {
            debug!("Slim report already present: {}", slim_path.display());
            continue;
        }

        let full = std::fs::read_to_string(&path).map_err(|source| TrendError::FileRead {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&slim_path, slim_report(&full))?;
        info!("Wrote slim report {}", slim_path.display());
        written.push(slim_path);
    }

    written.sort();
    Ok(written)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
