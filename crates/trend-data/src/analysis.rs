//! Batch pipeline: raw reports in, timeline out.
//!
//! Reports are parsed in parallel (each one is independent) and merged by the
//! [`TimelineBuilder`], which is the only ordering point. A report that fails
//! to parse is recorded and skipped; it never aborts the batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use trend_core::error::{ParseFailure, Result, TrendError};
use trend_core::models::{ParsedReport, RawReport};

use crate::parser::ReportParser;
use crate::reader::{DirectorySource, ReportSource, ReportVariant};
use crate::timeline::{Timeline, TimelineBuilder};

// ── Public types ──────────────────────────────────────────────────────────────

/// A report the parser refused, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedReport {
    /// File name or version labels, for display.
    pub name: String,
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Metadata produced alongside the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Reports handed to the pipeline.
    pub reports_found: usize,
    /// Reports that parsed successfully.
    pub reports_parsed: usize,
    /// Reports rejected by the parser.
    pub reports_rejected: usize,
    /// Snapshots in the resulting timeline.
    pub snapshots: usize,
    /// Chain breaks found while building the timeline.
    pub gaps: usize,
    /// Wall-clock seconds spent parsing.
    pub parse_time_seconds: f64,
}

/// The complete output of [`analyze_reports`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub timeline: Timeline,
    pub rejected: Vec<RejectedReport>,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// `true` when no report survived parsing.
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the pipeline over an in-memory batch.
///
/// `jobs` bounds the parser threads; `0` uses rayon's global pool.
pub fn analyze_reports(reports: Vec<RawReport>, jobs: usize) -> Result<AnalysisResult> {
    let parser = ReportParser::default();

    let parse_start = Instant::now();
    let outcomes = if jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| TrendError::Config(format!("cannot start {jobs} parse workers: {e}")))?;
        pool.install(|| parse_all(&parser, &reports))
    } else {
        parse_all(&parser, &reports)
    };
    let parse_time = parse_start.elapsed().as_secs_f64();

    let mut parsed: Vec<ParsedReport> = Vec::with_capacity(reports.len());
    let mut rejected = Vec::new();
    for (raw, outcome) in reports.iter().zip(outcomes) {
        match outcome {
            Ok(report) => parsed.push(report),
            Err(failure) => {
                warn!("Rejected {}: {}", raw.display_name(), failure);
                rejected.push(RejectedReport {
                    name: raw.display_name(),
                    path: raw.source.clone(),
                    reason: failure.reason(),
                });
            }
        }
    }

    let reports_parsed = parsed.len();
    let timeline = TimelineBuilder::build(parsed);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        reports_found: reports.len(),
        reports_parsed,
        reports_rejected: rejected.len(),
        snapshots: timeline.len(),
        gaps: timeline.gaps().len(),
        parse_time_seconds: parse_time,
    };

    info!(
        "Parsed {}/{} reports into {} snapshots ({} gaps)",
        metadata.reports_parsed, metadata.reports_found, metadata.snapshots, metadata.gaps
    );

    Ok(AnalysisResult {
        timeline,
        rejected,
        metadata,
    })
}

/// Load every report from `source`, then run [`analyze_reports`].
pub fn analyze_source(source: &dyn ReportSource, jobs: usize) -> Result<AnalysisResult> {
    analyze_reports(source.load()?, jobs)
}

/// Load the reports under `dir` and run the pipeline.
pub fn analyze_directory(
    dir: &Path,
    variant: ReportVariant,
    jobs: usize,
) -> Result<AnalysisResult> {
    info!("Reading reports from {}", dir.display());
    analyze_source(&DirectorySource::new(dir, variant), jobs)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_all(
    parser: &ReportParser,
    reports: &[RawReport],
) -> Vec<std::result::Result<ParsedReport, ParseFailure>> {
    reports.par_iter().map(|raw| parser.parse_raw(raw)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ReportFixture;
    use tempfile::TempDir;

    fn raw(old: &str, new: &str, old_code: i64, new_code: i64) -> RawReport {
        let text = ReportFixture::new(old, new).codes(old_code, new_code).render();
        RawReport::new(text, old, new)
    }

    #[test]
    fn test_analyze_chain() {
        let reports = vec![
            raw("1.1.0", "1.2.0", 2, 3),
            raw("1.0.0", "1.1.0", 1, 2),
            raw("1.2.0", "1.3.0", 3, 4),
        ];
        let result = analyze_reports(reports, 0).unwrap();
        assert_eq!(
            result.timeline.versions(),
            vec!["1.0.0", "1.1.0", "1.2.0", "1.3.0"]
        );
        assert!(result.rejected.is_empty());
        assert_eq!(result.metadata.reports_found, 3);
        assert_eq!(result.metadata.reports_parsed, 3);
        assert_eq!(result.metadata.snapshots, 4);
        assert_eq!(result.metadata.gaps, 0);
    }

    #[test]
    fn test_analyze_bad_report_does_not_abort_batch() {
        let reports = vec![
            raw("1.0.0", "1.1.0", 1, 2),
            RawReport::new("no header here", "1.1.0", "1.2.0").with_source("/r/1.1.0_to_1.2.0.txt"),
            raw("1.1.0", "1.2.0", 2, 3),
        ];
        let result = analyze_reports(reports, 0).unwrap();
        assert_eq!(result.timeline.len(), 3);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].name, "1.1.0_to_1.2.0.txt");
        assert!(!result.rejected[0].reason.is_empty());
        assert_eq!(result.metadata.reports_rejected, 1);
    }

    #[test]
    fn test_analyze_empty_batch() {
        let result = analyze_reports(Vec::new(), 0).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.metadata.reports_found, 0);
    }

    #[test]
    fn test_analyze_all_rejected_is_empty() {
        let reports = vec![RawReport::new("garbage", "a", "b")];
        let result = analyze_reports(reports, 0).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.rejected.len(), 1);
    }

    #[test]
    fn test_analyze_dedicated_pool_matches_global() {
        let batch: Vec<RawReport> = (0..12)
            .map(|i| raw(&format!("1.{i}.0"), &format!("1.{}.0", i + 1), i, i + 1))
            .collect();
        let pooled = analyze_reports(batch.clone(), 3).unwrap();
        let global = analyze_reports(batch, 0).unwrap();
        assert_eq!(pooled.timeline, global.timeline);
        assert_eq!(pooled.timeline.len(), 13);
    }

    #[test]
    fn test_analyze_source_in_memory() {
        let source = vec![raw("1.0.0", "1.1.0", 1, 2)];
        let result = analyze_source(&source, 0).unwrap();
        assert_eq!(result.timeline.versions(), vec!["1.0.0", "1.1.0"]);
    }

    #[test]
    fn test_analyze_directory() {
        let dir = TempDir::new().unwrap();
        for (old, new, oc, nc) in [("1.0.0", "1.1.0", 1, 2), ("1.1.0", "1.2.0", 2, 3)] {
            let text = ReportFixture::new(old, new).codes(oc, nc).render();
            std::fs::write(dir.path().join(format!("{old}_to_{new}.txt")), text).unwrap();
        }
        std::fs::write(dir.path().join("1.2.0_to_1.3.0.txt"), "truncated download").unwrap();

        let result = analyze_directory(dir.path(), ReportVariant::Auto, 2).unwrap();
        assert_eq!(result.timeline.versions(), vec!["1.0.0", "1.1.0", "1.2.0"]);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(
            result.rejected[0].path,
            Some(dir.path().join("1.2.0_to_1.3.0.txt"))
        );
    }

    #[test]
    fn test_analyze_directory_keeps_non_utf8_report() {
        let dir = TempDir::new().unwrap();
        let mut body = ReportFixture::new("1.0.0", "1.1.0").codes(1, 2).render().into_bytes();
        body.extend_from_slice(b"\xff\xfe trailing garbage\n");
        std::fs::write(dir.path().join("1.0.0_to_1.1.0.txt"), body).unwrap();

        let result = analyze_directory(dir.path(), ReportVariant::Auto, 0).unwrap();
        assert_eq!(result.metadata.reports_found, 1);
        assert_eq!(result.timeline.versions(), vec!["1.0.0", "1.1.0"]);
    }

    #[test]
    fn test_analyze_directory_missing() {
        let result = analyze_directory(
            Path::new("/tmp/does-not-exist-apk-trend-xyz"),
            ReportVariant::Auto,
            0,
        );
        assert!(matches!(result, Err(TrendError::ReportsDirNotFound(_))));
    }
}
