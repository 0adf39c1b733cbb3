mod bootstrap;
mod summary;

use anyhow::Result;
use trend_core::error::TrendError;
use trend_core::settings::Settings;
use trend_data::analysis::analyze_directory;
use trend_data::reader::ReportVariant;
use trend_data::slim::write_slim_reports;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_ref())?;
    settings.validate()?;

    tracing::info!("apk-trend v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Reports: {}, variant: {}, jobs: {}",
        settings.reports_dir.display(),
        settings.variant,
        settings.jobs
    );

    let variant: ReportVariant = settings.variant.parse()?;

    if settings.write_slim {
        let written = write_slim_reports(&settings.reports_dir)?;
        tracing::info!("Wrote {} slim report(s)", written.len());
    }

    let result = analyze_directory(&settings.reports_dir, variant, settings.jobs)?;

    for rejected in &result.rejected {
        tracing::warn!("Skipped {}: {}", rejected.name, rejected.reason);
    }

    if result.is_empty() {
        return Err(TrendError::NoUsableReports(settings.reports_dir.clone()).into());
    }

    if let Some(line) = summary::summarize(&result.timeline) {
        tracing::info!("{}", line);
    }

    let json = serde_json::to_string_pretty(&result.timeline).map_err(TrendError::from)?;
    match &settings.output {
        Some(path) => {
            bootstrap::write_output(path, &json)?;
            tracing::info!(
                "Timeline with {} snapshots written to {}",
                result.timeline.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }

    let gaps = result.timeline.gaps().len();
    if gaps > 0 && settings.fail_on_gap {
        return Err(TrendError::TimelineGaps(gaps).into());
    }

    Ok(())
}
