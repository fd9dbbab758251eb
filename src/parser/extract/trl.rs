use std::sync::LazyLock;

use regex::Regex;

// Second level sits on the same line: either behind a repeated "TRL"
// anchor, or within a short separator such as "-" or " to ".
static TRL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)TRL\s*(\d+)(?:[^\d\n]*?TRL\s*|[^\d\n]{0,12})(\d+)?").unwrap()
});

const MAX_LEVEL: u32 = 9;

/// "TRL 6" → "6", "TRL 4-5" / "TRL 4 to 5" → "4-5".
pub fn trl(text: &str) -> Option<String> {
    let caps = TRL_RE.captures(text)?;
    let low = &caps[1];
    let high = caps
        .get(2)
        .map(|m| m.as_str())
        .filter(|high| is_upper_level(low, high));

    Some(match high {
        Some(high) => format!("{}-{}", low, high),
        None => low.to_string(),
    })
}

fn is_upper_level(low: &str, high: &str) -> bool {
    match (low.parse::<u32>(), high.parse::<u32>()) {
        (Ok(low), Ok(high)) => high > low && high <= MAX_LEVEL,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_level() {
        assert_eq!(trl("achieve TRL 6 by the end of the project").as_deref(), Some("6"));
    }

    #[test]
    fn range_forms() {
        assert_eq!(trl("TRL 4-5").as_deref(), Some("4-5"));
        assert_eq!(trl("trl 3 to 5").as_deref(), Some("3-5"));
        assert_eq!(trl("TRL5-7 expected").as_deref(), Some("5-7"));
    }

    #[test]
    fn range_across_repeated_anchor() {
        let text = "Activities are expected to start at TRL 3 and achieve TRL 5 by the end of the project.";
        assert_eq!(trl(text).as_deref(), Some("3-5"));
        assert_eq!(trl("from TRL 6 and reaching at least TRL 4").as_deref(), Some("6"));
        assert_eq!(trl("start at TRL 3\nachieve TRL 5").as_deref(), Some("3"));
    }

    #[test]
    fn unrelated_number_not_a_range() {
        assert_eq!(trl("TRL 6 by 2027").as_deref(), Some("6"));
        assert_eq!(trl("TRL 6\nEUR 3 million").as_deref(), Some("6"));
    }

    #[test]
    fn absent() {
        assert_eq!(trl("Technology Readiness Level not specified"), None);
    }
}
