use trend_core::formatting::{format_count, format_mib, format_signed_kib, percentage};
use trend_core::models::TOTAL_COMPONENT;
use trend_data::timeline::Timeline;

/// One-line trend summary: first → last release, total compressed size change
/// and method count change, when those values are known at both ends.
pub fn summarize(timeline: &Timeline) -> Option<String> {
    let first = timeline.first()?;
    let last = timeline.last()?;

    let mut line = format!(
        "{} → {}: {} releases",
        first.version,
        last.version,
        timeline.len()
    );

    if let (Some(start), Some(end)) = (
        first.compressed.get(TOTAL_COMPONENT),
        last.compressed.get(TOTAL_COMPONENT),
    ) {
        let change = end - start;
        line.push_str(&format!(
            ", compressed {} → {} ({}, {:+.1}%)",
            format_mib(*start),
            format_mib(*end),
            format_signed_kib(change),
            percentage(change, *start, 1)
        ));
    }

    if let (Some(start), Some(end)) = (first.dex.get("methods"), last.dex.get("methods")) {
        line.push_str(&format!(
            ", methods {} → {}",
            format_count(*start),
            format_count(*end)
        ));
    }

    Some(line)
}
