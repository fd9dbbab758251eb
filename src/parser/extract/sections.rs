/// Lowercase keyword opening the expected-outcome section.
const EXPECTED_OUTCOME: &str = "expected outcome:";
const EXPECTED_OUTCOME_STOPS: &[&str] = &[
    "scope:",
    "objective:",
    "expected impact:",
    "eligibility:",
    "budget",
];

const SCOPE: &str = "scope:";
const SCOPE_STOPS: &[&str] = &["objective:", "expected outcome:", "expected impact:", "budget"];

pub fn expected_outcome(text: &str) -> Option<String> {
    collect_section(text, EXPECTED_OUTCOME, EXPECTED_OUTCOME_STOPS)
}

pub fn scope(text: &str) -> Option<String> {
    collect_section(text, SCOPE, SCOPE_STOPS)
}

/// Text from the first line containing `keyword` (after its first colon) up
/// to, not including, the first later line starting with a stop keyword.
/// Both keyword and stops are lowercase.
pub(crate) fn collect_section(text: &str, keyword: &str, stops: &[&str]) -> Option<String> {
    let mut lines = text.lines();
    let first = lines.find(|l| l.to_lowercase().contains(keyword))?;

    let head = first.split_once(':').map_or(first, |(_, rest)| rest).trim();
    let mut collected = vec![head];
    for line in lines {
        let lower = line.to_lowercase();
        if stops.iter().any(|s| lower.starts_with(s)) {
            break;
        }
        collected.push(line);
    }

    let section = collected.join("\n").trim().to_string();
    (!section.is_empty()).then_some(section)
}
