use std::sync::LazyLock;

use regex::Regex;

use crate::parser::topics::TOPIC_LINE_RE;

static CALL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*call\s*[:\-]").unwrap());
static CALL_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*Call:\s*(.+)$").unwrap());

const TYPE_OF_ACTION: &str = "type of action";

/// Title text after the identifier plus any wrapped lines, up to the
/// "Call:" line.
pub fn title(text: &str) -> Option<String> {
    let mut lines = text.lines();
    let head = lines.find_map(|l| TOPIC_LINE_RE.captures(l))?;

    let mut fragments = vec![head[2].trim().to_string()];
    for line in lines {
        if CALL_PREFIX_RE.is_match(line) {
            break;
        }
        fragments.push(line.trim().to_string());
    }

    let title = fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    (!title.is_empty()).then_some(title)
}

/// Remainder of the first "Call:" line.
pub fn call_name(text: &str) -> Option<String> {
    CALL_LINE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|c| !c.is_empty())
}

/// The value printed on the line after the "Type of Action" label.
pub fn type_of_action(text: &str) -> Option<String> {
    let mut lines = text.lines();
    lines.find(|l| l.to_lowercase().contains(TYPE_OF_ACTION))?;
    lines.map(str::trim).find(|l| !l.is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_title() {
        let text = "HORIZON-CL5-2025-D3-01: Next-generation\nphotovoltaic modules\nCall: Energy\nmore";
        assert_eq!(title(text).as_deref(), Some("Next-generation photovoltaic modules"));
    }

    #[test]
    fn title_stops_at_call_dash() {
        let text = "HORIZON-A-2025-01: Short\nCall - Energy";
        assert_eq!(title(text).as_deref(), Some("Short"));
    }

    #[test]
    fn title_without_call_runs_to_end() {
        let text = "HORIZON-A-2025-01: One\ntwo";
        assert_eq!(title(text).as_deref(), Some("One two"));
    }

    #[test]
    fn empty_title_fragment_skipped() {
        let text = "HORIZON-A-2025-01:\nActual title\nCall: C";
        assert_eq!(title(text).as_deref(), Some("Actual title"));
    }

    #[test]
    fn no_identifier_no_title() {
        assert_eq!(title("Call: C\nScope: S"), None);
    }

    #[test]
    fn call_name_case_insensitive() {
        let text = "HORIZON-A-2025-01: T\n  CALL:  Clean energy transition  \nScope: S";
        assert_eq!(call_name(text).as_deref(), Some("Clean energy transition"));
    }

    #[test]
    fn call_name_requires_line_start() {
        assert_eq!(call_name("See the Call: Other for details"), None);
    }

    #[test]
    fn type_of_action_next_line() {
        let text = "Type of Action\n\nResearch and Innovation Actions\nTRL 4";
        assert_eq!(type_of_action(text).as_deref(), Some("Research and Innovation Actions"));
    }

    #[test]
    fn type_of_action_missing_value() {
        assert_eq!(type_of_action("Type of Action"), None);
        assert_eq!(type_of_action("Scope: S"), None);
    }
}
