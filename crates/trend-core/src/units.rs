//! Conversion of human-readable table cells into numbers.
//!
//! Both parsers are lenient: a cell without a recognisable value yields
//! `None`, which callers treat as "field not present".

use regex::Regex;
use std::sync::OnceLock;

const KIB_PER_MIB: f64 = 1024.0;
const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

fn size_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([\d.]+)\s*(GiB|MiB|KiB|B)").expect("regex is valid"))
}

fn count_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[+-]?\d+(?:,\d+)*").expect("regex is valid"))
}

/// Parse a size cell such as `"  3.2 MiB "` into MiB.
///
/// Any sign in front of the number is ignored, so delta cells yield their
/// magnitude.
///
/// # Examples
///
/// ```
/// use trend_core::units::parse_size;
///
/// assert_eq!(parse_size("3.2 MiB"), Some(3.2));
/// assert_eq!(parse_size("512 KiB"), Some(0.5));
/// assert_eq!(parse_size("garbage"), None);
/// ```
pub fn parse_size(text: &str) -> Option<f64> {
    size_pattern().captures_iter(text).find_map(|caps| {
        let value: f64 = caps[1].parse().ok()?;
        let mib = match &caps[2] {
            "GiB" => value * KIB_PER_MIB,
            "MiB" => value,
            "KiB" => value / KIB_PER_MIB,
            "B" => value / BYTES_PER_MIB,
            _ => return None,
        };
        Some(mib)
    })
}

/// Extract the first integer in a count cell.
///
/// Thousands separators are dropped and a leading `+`/`-` is honoured. In a
/// delta cell like `"+7 (+123 -116)"` only the net change is returned.
///
/// # Examples
///
/// ```
/// use trend_core::units::parse_count;
///
/// assert_eq!(parse_count("21,481"), Some(21481));
/// assert_eq!(parse_count("+7 (+123 -116)"), Some(7));
/// assert_eq!(parse_count(""), None);
/// ```
pub fn parse_count(text: &str) -> Option<i64> {
    let m = count_pattern().find(text)?;
    m.as_str().replace(',', "").parse().ok()
}
