use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, TrendError};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Build an APK size and code-metric timeline from diff reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "apk-trend",
    about = "Build an APK size and code-metric timeline from diff reports",
    version
)]
pub struct Settings {
    /// Directory holding `<old>_to_<new>.txt` comparison reports
    #[arg(long, env = "APK_TREND_REPORTS_DIR", default_value = "docs/apk-diffs")]
    pub reports_dir: PathBuf,

    /// Write the timeline JSON here instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Which report files to read for each version pair
    #[arg(long, default_value = "auto", value_parser = ["full", "slim", "auto"])]
    pub variant: String,

    /// Derive a `-slim.txt` report for every full report lacking one
    #[arg(long)]
    pub write_slim: bool,

    /// Exit with an error when the version chain has gaps
    #[arg(long)]
    pub fail_on_gap: bool,

    /// Worker threads for parsing (0 = one per core)
    #[arg(long, default_value = "0")]
    pub jobs: usize,

    /// Logging level
    #[arg(long, env = "APK_TREND_LOG", default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse settings from the process arguments and environment.
    pub fn load() -> Self {
        Self::parse()
    }

    /// The effective log level, with `--debug` taking precedence.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// Reject combinations clap cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if self.write_slim && self.variant == "full" {
            return Err(TrendError::Config(
                "--write-slim has no effect with --variant full".to_string(),
            ));
        }
        if let Some(out) = &self.output {
            if out.is_dir() {
                return Err(TrendError::Config(format!(
                    "output path {} is a directory",
                    out.display()
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
