use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reserved component key for the aggregate row of the APK size table.
pub const TOTAL_COMPONENT: &str = "total";

/// Metric rows accepted from the `DEX` table.
pub const DEX_METRICS: &[&str] = &["files", "strings", "types", "classes", "methods", "fields"];

/// Metric rows accepted from the `ARSC` table.
pub const ARSC_METRICS: &[&str] = &["configs", "entries"];

/// Metric name → absolute count for one side of a count table.
pub type CountTable = BTreeMap<String, i64>;

/// One comparison report as handed over by a report source.
///
/// The labels are what the source *claims* the report compares (typically
/// taken from the file name); the header line inside `text` is authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    /// Full report text.
    pub text: String,
    /// Claimed old version label.
    pub old_label: String,
    /// Claimed new version label.
    pub new_label: String,
    /// Where the text came from, if it came from disk.
    pub source: Option<PathBuf>,
}

impl RawReport {
    pub fn new(
        text: impl Into<String>,
        old_label: impl Into<String>,
        new_label: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            old_label: old_label.into(),
            new_label: new_label.into(),
            source: None,
        }
    }

    /// Attach the path the report was read from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Display name used in log lines: the file name when known, the labels
    /// otherwise.
    pub fn display_name(&self) -> String {
        match self.source.as_ref().and_then(|p| p.file_name()) {
            Some(name) => name.to_string_lossy().into_owned(),
            None => format!("{} → {}", self.old_label, self.new_label),
        }
    }
}

/// Compressed and uncompressed size of a single APK component, in MiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSize {
    pub compressed: Option<f64>,
    pub uncompressed: Option<f64>,
}

/// Component name → size in MiB, split by compressed and uncompressed.
///
/// Component names are kept verbatim so unknown components emitted by newer
/// diff tools pass straight through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizeTable {
    #[serde(default)]
    pub compressed: BTreeMap<String, f64>,
    #[serde(default)]
    pub uncompressed: BTreeMap<String, f64>,
}

impl SizeTable {
    /// Record whichever of the two sizes are present for `component`.
    pub fn insert(&mut self, component: &str, size: ComponentSize) {
        if let Some(c) = size.compressed {
            self.compressed.insert(component.to_string(), c);
        }
        if let Some(u) = size.uncompressed {
            self.uncompressed.insert(component.to_string(), u);
        }
    }

    /// Look up both sizes of `component`.
    pub fn get(&self, component: &str) -> ComponentSize {
        ComponentSize {
            compressed: self.compressed.get(component).copied(),
            uncompressed: self.uncompressed.get(component).copied(),
        }
    }

    /// The aggregate `total` row.
    pub fn total(&self) -> ComponentSize {
        self.get(TOTAL_COMPONENT)
    }

    pub fn is_empty(&self) -> bool {
        self.compressed.is_empty() && self.uncompressed.is_empty()
    }
}

/// All tables read from one side (old or new) of a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideMetrics {
    pub apk_sizes: SizeTable,
    pub dex_metrics: CountTable,
    pub arsc_metrics: CountTable,
}

/// Structured form of one comparison report.
///
/// The top-level tables hold the *new* side's absolute values. `baseline`
/// holds the old side and is only consulted when the old release has to be
/// materialised as a snapshot of its own (start of a timeline, or after a
/// break in the version chain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReport {
    pub old_version: String,
    pub new_version: String,
    pub old_version_code: Option<i64>,
    pub new_version_code: Option<i64>,
    pub apk_sizes: SizeTable,
    pub dex_metrics: CountTable,
    pub arsc_metrics: CountTable,
    #[serde(default)]
    pub baseline: SideMetrics,
}

impl ParsedReport {
    /// Snapshot of the release this report compares *to*.
    pub fn new_snapshot(&self) -> VersionSnapshot {
        VersionSnapshot {
            version: self.new_version.clone(),
            version_code: self.new_version_code,
            compressed: self.apk_sizes.compressed.clone(),
            uncompressed: self.apk_sizes.uncompressed.clone(),
            dex: self.dex_metrics.clone(),
            arsc: self.arsc_metrics.clone(),
        }
    }

    /// Snapshot of the release this report compares *from*.
    pub fn old_snapshot(&self) -> VersionSnapshot {
        VersionSnapshot {
            version: self.old_version.clone(),
            version_code: self.old_version_code,
            compressed: self.baseline.apk_sizes.compressed.clone(),
            uncompressed: self.baseline.apk_sizes.uncompressed.clone(),
            dex: self.baseline.dex_metrics.clone(),
            arsc: self.baseline.arsc_metrics.clone(),
        }
    }
}

/// Absolute metric state of one release.
///
/// Serialised with the camelCase keys the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub version: String,
    pub version_code: Option<i64>,
    #[serde(default)]
    pub compressed: BTreeMap<String, f64>,
    #[serde(default)]
    pub uncompressed: BTreeMap<String, f64>,
    #[serde(default)]
    pub dex: CountTable,
    #[serde(default)]
    pub arsc: CountTable,
}
