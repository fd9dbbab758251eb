use std::sync::LazyLock;

use regex::Regex;

static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
// A line holding only the single space left over from HSPACE_RE counts as blank.
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n(?: ?\n)+").unwrap());

/// Canonicalize extracted page text: `\n` line breaks only, no NBSPs, single
/// spaces, no blank-line runs, trimmed ends. Idempotent.
pub fn normalize_text(raw: &str) -> String {
    let text = raw
        .replace("\r\n", "\n")
        .replace(['\r', '\u{c}'], "\n")
        .replace('\u{a0}', " ");
    let text = HSPACE_RE.replace_all(&text, " ");
    let text = BLANK_RUN_RE.replace_all(&text, "\n");
    text.trim().to_string()
}

/// Non-empty trimmed lines of (normalized) text.
pub fn content_lines(text: &str) -> Vec<&str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings() {
        assert_eq!(normalize_text("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn nbsp_and_tabs() {
        assert_eq!(normalize_text("EUR\u{a0}2.50 \t million"), "EUR 2.50 million");
    }

    #[test]
    fn blank_runs_collapse() {
        assert_eq!(normalize_text("a\n\n\n\nb"), "a\nb");
        assert_eq!(normalize_text("a\n \t \n\nb"), "a\nb");
    }

    #[test]
    fn trims_ends() {
        assert_eq!(normalize_text("\n\n  Call: X  \n\n"), "Call: X");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\r\n "), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "HORIZON-CL5-2025-D3-01:\u{a0}Title\r\n\r\n\r\nCall:   X\n \nScope:\tY ",
            "a \n b \n\n c",
            "\u{c}page two\n\n",
        ];
        for raw in inputs {
            let once = normalize_text(raw);
            assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn fixture_idempotent() {
        let raw = std::fs::read_to_string("tests/fixtures/work_programme.txt").unwrap();
        let once = normalize_text(&raw);
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn content_lines_skip_blanks() {
        assert_eq!(content_lines("  a \n\n b\n   \n"), vec!["a", "b"]);
    }
}
