use std::sync::LazyLock;

use regex::Regex;

use super::dates::{find_dates, first_date};

static SCHEDULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Opening\s*:*\s*(\d{1,2} [A-Za-z]+\.? \d{4})\s*Deadline\(s\)\s*:*\s*([^\n]+)")
        .unwrap()
});
static CALL_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*Call\s*[-:]\s*(.+)$").unwrap());
static CALL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HORIZON-[A-Z0-9]+-\d{4}-[A-Za-z0-9\-]+").unwrap());

/// Call-level view: one row per "Opening ... Deadline(s)" pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSchedule {
    pub call_name: Option<String>,
    pub call_id: Option<String>,
    pub opening_date: Option<String>,
    pub deadline1: Option<String>,
    pub deadline2: Option<String>,
}

/// Scan normalized text for call opening/deadline pairs, naming each after
/// the closest preceding call heading and call identifier.
pub fn scan_call_schedule(text: &str) -> Vec<CallSchedule> {
    SCHEDULE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let preceding = &text[..whole.start()];
            let mut deadlines = find_dates(&caps[2]).into_iter().map(|d| d.value);

            Some(CallSchedule {
                call_name: CALL_HEADING_RE
                    .captures_iter(preceding)
                    .last()
                    .map(|c| c[1].trim().to_string()),
                call_id: CALL_ID_RE
                    .find_iter(preceding)
                    .last()
                    .map(|m| m.as_str().trim_end_matches('-').to_string()),
                opening_date: first_date(&caps[1]),
                deadline1: deadlines.next(),
                deadline2: deadlines.next(),
            })
        })
        .collect()
}

/// Lowercased, trimmed key used to compare call names across views.
pub fn call_key(name: &str) -> String {
    name.trim().to_lowercase()
}
