//! Stitches pairwise `old → new` reports into one ordered version history.
//!
//! Reports are sorted by the new side's version code; the first report's old
//! side seeds the timeline and every report then contributes its new side.
//! Continuity between neighbours is checked, and breaks are recorded as
//! [`TimelineGap`]s instead of silently producing a misleading history.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use trend_core::models::{CountTable, ParsedReport, VersionSnapshot};

// ── TimelineGap ───────────────────────────────────────────────────────────────

/// How a report failed to continue the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapKind {
    /// One or more releases between the previous snapshot and the report's
    /// old side have no report.
    Missing,
    /// The report covers releases that are already in the timeline.
    Overlap,
}

/// A break in the version chain between two consecutive sorted reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGap {
    pub kind: GapKind,
    /// Last snapshot in the timeline when the report was reached.
    pub previous_version: String,
    pub previous_code: Option<i64>,
    /// The report that did not line up.
    pub old_version: String,
    pub old_code: Option<i64>,
    pub new_version: String,
    pub new_code: Option<i64>,
}

impl fmt::Display for TimelineGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            GapKind::Missing => "missing releases",
            GapKind::Overlap => "overlapping report",
        };
        write!(
            f,
            "{} after {} ({}): report {} ({}) → {} ({})",
            kind,
            self.previous_version,
            fmt_code(self.previous_code),
            self.old_version,
            fmt_code(self.old_code),
            self.new_version,
            fmt_code(self.new_code),
        )
    }
}

fn fmt_code(code: Option<i64>) -> String {
    code.map_or_else(|| "?".to_string(), |c| c.to_string())
}

// ── Timeline ──────────────────────────────────────────────────────────────────

/// Ordered, deduplicated snapshots plus any chain breaks found while
/// building them.
///
/// Serialises as the bare array of snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    snapshots: Vec<VersionSnapshot>,
    gaps: Vec<TimelineGap>,
}

impl Timeline {
    pub fn snapshots(&self) -> &[VersionSnapshot] {
        &self.snapshots
    }

    pub fn gaps(&self) -> &[TimelineGap] {
        &self.gaps
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first(&self) -> Option<&VersionSnapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&VersionSnapshot> {
        self.snapshots.last()
    }

    /// Version strings in timeline order.
    pub fn versions(&self) -> Vec<&str> {
        self.snapshots.iter().map(|s| s.version.as_str()).collect()
    }

    pub fn into_snapshots(self) -> Vec<VersionSnapshot> {
        self.snapshots
    }

    /// Change between each pair of neighbouring snapshots.
    pub fn deltas(&self) -> Vec<SnapshotDelta> {
        self.snapshots
            .windows(2)
            .map(|pair| SnapshotDelta::between(&pair[0], &pair[1]))
            .collect()
    }
}

impl Serialize for Timeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.snapshots)
    }
}

// ── SnapshotDelta ─────────────────────────────────────────────────────────────

/// Difference between two snapshots, for keys present on both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDelta {
    pub from_version: String,
    pub to_version: String,
    /// Size change per component, in MiB.
    pub compressed: BTreeMap<String, f64>,
    pub uncompressed: BTreeMap<String, f64>,
    pub dex: CountTable,
    pub arsc: CountTable,
}

impl SnapshotDelta {
    pub fn between(from: &VersionSnapshot, to: &VersionSnapshot) -> Self {
        Self {
            from_version: from.version.clone(),
            to_version: to.version.clone(),
            compressed: diff_sizes(&from.compressed, &to.compressed),
            uncompressed: diff_sizes(&from.uncompressed, &to.uncompressed),
            dex: diff_counts(&from.dex, &to.dex),
            arsc: diff_counts(&from.arsc, &to.arsc),
        }
    }
}

fn diff_sizes(from: &BTreeMap<String, f64>, to: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    to.iter()
        .filter_map(|(k, new)| from.get(k).map(|old| (k.clone(), new - old)))
        .collect()
}

fn diff_counts(from: &CountTable, to: &CountTable) -> CountTable {
    to.iter()
        .filter_map(|(k, new)| from.get(k).map(|old| (k.clone(), new - old)))
        .collect()
}

// ── TimelineBuilder ───────────────────────────────────────────────────────────

/// Stateless helper that merges parsed reports into a [`Timeline`].
pub struct TimelineBuilder;

impl TimelineBuilder {
    /// Build the timeline for a batch of reports.
    ///
    /// Reports without a new version code sort after all coded ones, in input
    /// order. An empty batch gives an empty timeline.
    pub fn build(mut reports: Vec<ParsedReport>) -> Timeline {
        if reports.is_empty() {
            return Timeline::default();
        }

        // Stable sort keeps uncoded reports in input order.
        reports.sort_by_key(|r| (r.new_version_code.is_none(), r.new_version_code));

        let mut snapshots = vec![reports[0].old_snapshot()];
        let mut gaps = Vec::new();

        for report in &reports {
            let Some(previous) = snapshots.last() else {
                break;
            };

            match link(previous, report, &snapshots) {
                Link::Continues => {}
                Link::Break(kind) => {
                    let gap = gap_between(kind, previous, report);
                    warn!("Timeline gap: {}", gap);
                    gaps.push(gap);

                    if kind == GapKind::Missing {
                        snapshots.push(report.old_snapshot());
                    }
                }
                Link::Redundant => {
                    let gap = gap_between(GapKind::Overlap, previous, report);
                    warn!("Skipping report already covered by timeline: {}", gap);
                    gaps.push(gap);
                    continue;
                }
            }

            snapshots.push(report.new_snapshot());
        }

        debug!(
            "Built timeline of {} snapshots from {} reports ({} gaps)",
            snapshots.len(),
            reports.len(),
            gaps.len()
        );

        Timeline { snapshots, gaps }
    }
}

/// Convenience wrapper around [`TimelineBuilder::build`].
pub fn build_timeline(reports: Vec<ParsedReport>) -> Timeline {
    TimelineBuilder::build(reports)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn gap_between(kind: GapKind, previous: &VersionSnapshot, report: &ParsedReport) -> TimelineGap {
    TimelineGap {
        kind,
        previous_version: previous.version.clone(),
        previous_code: previous.version_code,
        old_version: report.old_version.clone(),
        old_code: report.old_version_code,
        new_version: report.new_version.clone(),
        new_code: report.new_version_code,
    }
}

enum Link {
    /// The report's old side is the previous snapshot.
    Continues,
    /// The report advances the timeline but does not start where it ends.
    Break(GapKind),
    /// The report's new side is not newer than the timeline's end.
    Redundant,
}

fn link(previous: &VersionSnapshot, report: &ParsedReport, snapshots: &[VersionSnapshot]) -> Link {
    match (previous.version_code, report.new_version_code) {
        (Some(prev), Some(new)) if new <= prev => return Link::Redundant,
        _ => {}
    }
    if snapshots.iter().any(|s| s.version == report.new_version) {
        return Link::Redundant;
    }

    match (previous.version_code, report.old_version_code) {
        (Some(prev), Some(old)) if old == prev => Link::Continues,
        (Some(prev), Some(old)) if old < prev => Link::Break(GapKind::Overlap),
        (Some(_), Some(_)) => Link::Break(GapKind::Missing),
        _ if previous.version == report.old_version => Link::Continues,
        _ if snapshots.iter().any(|s| s.version == report.old_version) => {
            Link::Break(GapKind::Overlap)
        }
        _ => Link::Break(GapKind::Missing),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
