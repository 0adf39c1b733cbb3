use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the APK trend pipeline.
#[derive(Error, Debug)]
pub enum TrendError {
    /// A report file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be produced or parsed.
    #[error("Failed to serialize JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The directory expected to hold comparison reports does not exist.
    #[error("Reports directory not found: {0}")]
    ReportsDirNotFound(PathBuf),

    /// Every report in the batch was rejected, or none were found.
    #[error("No usable reports found in {0}")]
    NoUsableReports(PathBuf),

    /// The rebuilt timeline has breaks in its version chain.
    #[error("Timeline has {0} gap(s) in its version chain")]
    TimelineGaps(usize),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the trend crates.
pub type Result<T> = std::result::Result<T, TrendError>;

/// Why a single report was rejected by the parser.
///
/// Rejections are values, not faults: the batch keeps going and the caller
/// decides whether to log or surface them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// The `<label>: <old> → <new>` comparison line is absent.
    #[error("missing comparison header line `<label>: <old> → <new>`")]
    MissingHeader,
}

impl ParseFailure {
    /// Human-readable reason attached to a rejected report.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
