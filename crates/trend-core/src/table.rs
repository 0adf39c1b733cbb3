//! Box-drawing table handling for diff reports.
//!
//! A report is a run of named tables:
//!
//! ```text
//!  DEX     │ old   │ new   │ diff
//! ─────────┼───────┼───────┼───────────
//!    files │     1 │     1 │   0
//!  strings │ 15957 │ 15958 │ +1 (+4 -3)
//! ```
//!
//! [`TableGlyphs`] tokenizes rows; [`extract_section`] isolates one table's
//! data rows. Neither knows what the columns mean.

use std::fmt;

// ── Glyphs and row tokenizer ──────────────────────────────────────────────────

/// The glyphs a report uses to draw its tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableGlyphs {
    /// Vertical rule between cells.
    pub column_separator: char,
    /// Horizontal rule under headers and above footers.
    pub border_rule: char,
}

impl Default for TableGlyphs {
    fn default() -> Self {
        Self {
            column_separator: '│',
            border_rule: '─',
        }
    }
}

impl TableGlyphs {
    /// `true` for a line drawn entirely from rule glyphs, such as
    /// `─────────┼───────┼──────`.
    pub fn is_border_rule(&self, line: &str) -> bool {
        let trimmed = line.trim();
        !trimmed.is_empty()
            && trimmed.contains(self.border_rule)
            && trimmed.chars().all(|c| {
                c == self.border_rule
                    || c == self.column_separator
                    || c.is_whitespace()
                    || is_box_drawing(c)
            })
    }

    /// Split a row on the column separator and trim every cell.
    ///
    /// Returns `None` for lines that are not table rows (no separator, or a
    /// border rule).
    pub fn tokenize(&self, line: &str) -> Option<TableRow> {
        if !line.contains(self.column_separator) || self.is_border_rule(line) {
            return None;
        }
        let mut cells = line.split(self.column_separator).map(str::trim);
        let key = cells.next().unwrap_or_default().to_string();
        let values = cells.map(str::to_string).collect();
        Some(TableRow { key, values })
    }

    /// The section a header line introduces, if any.
    pub fn header_section(&self, line: &str) -> Option<Section> {
        let row = self.tokenize(line)?;
        Section::ALL
            .iter()
            .copied()
            .find(|section| row.key == section.name())
    }

    fn is_data_row(&self, line: &str) -> bool {
        !line.trim().is_empty()
            && self.tokenize(line).is_some()
            && self.header_section(line).is_none()
    }
}

fn is_box_drawing(c: char) -> bool {
    ('\u{2500}'..='\u{257F}').contains(&c)
}

/// One tokenized table row: the key cell followed by positional values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// First cell, e.g. a component or metric name.
    pub key: String,
    /// Remaining cells, left to right. Narrow table variants simply have
    /// fewer of them.
    pub values: Vec<String>,
}

impl TableRow {
    /// Value cell at `index` (0 = first cell after the key).
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// Named tables a report may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Apk,
    Dex,
    Arsc,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Apk, Section::Dex, Section::Arsc];

    /// The key cell of the section's header row.
    pub fn name(self) -> &'static str {
        match self {
            Section::Apk => "APK",
            Section::Dex => "DEX",
            Section::Arsc => "ARSC",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The raw lines of one table, header excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock<'a> {
    pub section: Section,
    /// The header line carrying the section name and column labels.
    pub header: &'a str,
    /// Data rows in order. Border rules are not included.
    pub lines: Vec<&'a str>,
}

impl SectionBlock<'_> {
    /// Column labels from the header, without the section name.
    pub fn columns(&self, glyphs: &TableGlyphs) -> Vec<String> {
        glyphs
            .tokenize(self.header)
            .map(|row| row.values)
            .unwrap_or_default()
    }

    /// Tokenized data rows.
    pub fn rows(&self, glyphs: &TableGlyphs) -> Vec<TableRow> {
        self.lines
            .iter()
            .filter_map(|line| glyphs.tokenize(line))
            .collect()
    }
}

/// Locate `section` in `text` and return its data rows.
///
/// The body starts after the header (and the border rule right under it) and
/// ends at a blank line, a non-table line, the next section header, or a
/// border rule. A border rule followed directly by another data row is a
/// footer divider (as above a `total` row) and the body continues past it.
///
/// Returns `None` when the section does not appear; reduced report variants
/// leave some sections out entirely.
pub fn extract_section<'a>(
    text: &'a str,
    section: Section,
    glyphs: &TableGlyphs,
) -> Option<SectionBlock<'a>> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| glyphs.header_section(line) == Some(section))?;

    let mut i = start + 1;
    if lines.get(i).is_some_and(|line| glyphs.is_border_rule(line)) {
        i += 1;
    }

    let mut body = Vec::new();
    while let Some(&line) = lines.get(i) {
        if glyphs.is_border_rule(line) {
            match lines.get(i + 1) {
                Some(next) if glyphs.is_data_row(next) => {
                    i += 1;
                    continue;
                }
                _ => break,
            }
        }
        if !glyphs.is_data_row(line) {
            break;
        }
        body.push(line);
        i += 1;
    }

    Some(SectionBlock {
        section,
        header: lines[start],
        lines: body,
    })
}

/// First row anywhere in `text` whose key cell equals `key`.
pub fn find_row(text: &str, key: &str, glyphs: &TableGlyphs) -> Option<TableRow> {
    text.lines()
        .filter_map(|line| glyphs.tokenize(line))
        .find(|row| row.key == key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
