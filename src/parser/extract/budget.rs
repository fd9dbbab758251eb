use std::sync::LazyLock;

use regex::Regex;

// Matched against lowercased text.
static AROUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"around\s+eur\s+([\d.,]+)").unwrap());
static BETWEEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"between\s+eur\s+[\d.,]+\s+and\s+([\d.,]+)").unwrap());
static TOTAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"indicative budget.*?eur\s?([\d.,]+)").unwrap());

/// Figures in work programmes are stated in millions.
const MILLION: f64 = 1_000_000.0;

/// EU contribution per project: "around EUR x", else the upper bound of
/// "between EUR x and y".
pub fn per_project(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    AROUND_RE
        .captures(&lower)
        .or_else(|| BETWEEN_RE.captures(&lower))
        .and_then(|caps| parse_millions(&caps[1]))
}

/// Indicative total budget of the topic.
pub fn indicative_total(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    TOTAL_RE
        .captures(&lower)
        .and_then(|caps| parse_millions(&caps[1]))
}

/// "2.50" → 2_500_000. Commas are thousands separators; a trailing sentence
/// period is dropped. Unparseable figures yield `None`.
pub(crate) fn parse_millions(figure: &str) -> Option<u64> {
    let cleaned = figure.replace(',', "");
    let cleaned = cleaned.trim_end_matches('.');
    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    // Amounts must fit an SQLite INTEGER.
    let scaled = (value * MILLION).round();
    if scaled >= i64::MAX as f64 {
        return None;
    }
    Some(scaled as u64)
}
