//! Turns one raw diff report into a [`ParsedReport`].
//!
//! Only the comparison header line is mandatory. Version codes, whole
//! sections and individual rows degrade to absent values.

use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, warn};

use trend_core::error::ParseFailure;
use trend_core::models::{
    ComponentSize, CountTable, ParsedReport, RawReport, SideMetrics, SizeTable, ARSC_METRICS,
    DEX_METRICS,
};
use trend_core::table::{extract_section, find_row, Section, TableGlyphs, TableRow};
use trend_core::units::{parse_count, parse_size};

/// Key of the manifest row carrying the two version codes.
const VERSION_CODE_ROW: &str = "version code";

// ── Column layout ─────────────────────────────────────────────────────────────

/// Value-column offsets (0 = first cell after the key) of one side of the
/// APK size table.
#[derive(Debug, Clone, Copy)]
struct SizeColumns {
    compressed: usize,
    uncompressed: usize,
}

/// `old │ new │ diff` for compressed, then the same for uncompressed.
const APK_OLD: SizeColumns = SizeColumns {
    compressed: 0,
    uncompressed: 3,
};
const APK_NEW: SizeColumns = SizeColumns {
    compressed: 1,
    uncompressed: 4,
};

/// `old │ new │ diff` in the DEX and ARSC tables.
const COUNT_OLD: usize = 0;
const COUNT_NEW: usize = 1;

fn header_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[^\S\n]*[^:\n│]+:[^\S\n]+(\S+)[^\S\n]+(?:→|->)[^\S\n]+(\S+)")
            .expect("regex is valid")
    })
}

// ── ReportFormat / ReportParser ───────────────────────────────────────────────

/// Rendering details of the upstream diff tool that the parser depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFormat {
    pub glyphs: TableGlyphs,
}

/// Stateless report parser; cheap to copy and safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportParser {
    format: ReportFormat,
}

impl ReportParser {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Parse report text.
    ///
    /// Fails only when the comparison header is missing. Text after the new
    /// version on the header line is ignored.
    pub fn parse(&self, text: &str) -> Result<ParsedReport, ParseFailure> {
        let glyphs = &self.format.glyphs;

        let caps = header_pattern()
            .captures(text)
            .ok_or(ParseFailure::MissingHeader)?;
        let old_version = caps[1].to_string();
        let new_version = caps[2].to_string();

        let (old_version_code, new_version_code) =
            match extract_version_codes(text, glyphs) {
                (Some(old), Some(new)) if new <= old => {
                    warn!(
                        "{} → {}: version code does not advance ({} → {}), ignoring codes",
                        old_version, new_version, old, new
                    );
                    (None, None)
                }
                codes => codes,
            };

        let mut baseline = SideMetrics::default();
        let mut apk_sizes = SizeTable::default();
        for row in section_rows(text, Section::Apk, glyphs) {
            if row.key.is_empty() {
                continue;
            }
            apk_sizes.insert(&row.key, read_sizes(&row, APK_NEW));
            baseline.apk_sizes.insert(&row.key, read_sizes(&row, APK_OLD));
        }

        let (dex_metrics, old_dex) = read_counts(text, Section::Dex, DEX_METRICS, glyphs);
        let (arsc_metrics, old_arsc) = read_counts(text, Section::Arsc, ARSC_METRICS, glyphs);
        baseline.dex_metrics = old_dex;
        baseline.arsc_metrics = old_arsc;

        debug!(
            "Parsed {} → {}: {} size rows, {} dex metrics, {} arsc metrics",
            old_version,
            new_version,
            apk_sizes.compressed.len(),
            dex_metrics.len(),
            arsc_metrics.len()
        );

        Ok(ParsedReport {
            old_version,
            new_version,
            old_version_code,
            new_version_code,
            apk_sizes,
            dex_metrics,
            arsc_metrics,
            baseline,
        })
    }

    /// Parse a [`RawReport`], warning when the versions in its header differ
    /// from the labels the source claimed. The header wins.
    pub fn parse_raw(&self, raw: &RawReport) -> Result<ParsedReport, ParseFailure> {
        let parsed = self.parse(&raw.text)?;
        if !labels_match(&raw.old_label, &parsed.old_version)
            || !labels_match(&raw.new_label, &parsed.new_version)
        {
            warn!(
                "{}: labels {} → {} disagree with header {} → {}",
                raw.display_name(),
                raw.old_label,
                raw.new_label,
                parsed.old_version,
                parsed.new_version
            );
        }
        Ok(parsed)
    }
}

/// Parse report text with the default format.
pub fn parse_report(text: &str) -> Result<ParsedReport, ParseFailure> {
    ReportParser::default().parse(text)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Labels often carry a `v` tag prefix the header omits.
fn labels_match(label: &str, version: &str) -> bool {
    label.is_empty() || label == version || label.strip_prefix('v') == Some(version)
}

fn extract_version_codes(text: &str, glyphs: &TableGlyphs) -> (Option<i64>, Option<i64>) {
    match find_row(text, VERSION_CODE_ROW, glyphs) {
        Some(row) => (
            row.value(COUNT_OLD).and_then(parse_count),
            row.value(COUNT_NEW).and_then(parse_count),
        ),
        None => (None, None),
    }
}

fn section_rows(text: &str, section: Section, glyphs: &TableGlyphs) -> Vec<TableRow> {
    match extract_section(text, section, glyphs) {
        Some(block) => block.rows(glyphs),
        None => {
            debug!("Section {} not present", section);
            Vec::new()
        }
    }
}

fn read_sizes(row: &TableRow, columns: SizeColumns) -> ComponentSize {
    ComponentSize {
        compressed: row.value(columns.compressed).and_then(parse_size),
        uncompressed: row.value(columns.uncompressed).and_then(parse_size),
    }
}

/// Read `(new, old)` count tables, keeping only rows in `vocabulary`.
fn read_counts(
    text: &str,
    section: Section,
    vocabulary: &[&str],
    glyphs: &TableGlyphs,
) -> (CountTable, CountTable) {
    let mut new_side = CountTable::new();
    let mut old_side = CountTable::new();
    for row in section_rows(text, section, glyphs) {
        if !vocabulary.contains(&row.key.as_str()) {
            continue;
        }
        if let Some(v) = row.value(COUNT_NEW).and_then(parse_count) {
            new_side.insert(row.key.clone(), v);
        }
        if let Some(v) = row.value(COUNT_OLD).and_then(parse_count) {
            old_side.insert(row.key.clone(), v);
        }
    }
    (new_side, old_side)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
