use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        \b(?P<day>\d{1,2})\s+(?P<month>[a-z]{3,9})\.?\s+(?P<year>\d{4})\b
        | \b(?P<iy>\d{4})-(?P<im>\d{2})-(?P<id>\d{2})\b
        | \b(?P<sd>\d{1,2})/(?P<sm>\d{1,2})/(?P<sy>\d{4})\b",
    )
    .unwrap()
});

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\(([^)]*)\)").unwrap());

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

/// A recognized calendar date inside a line of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateToken {
    /// "D Month YYYY" and ISO dates as written; slash dates rewritten to ISO.
    pub value: String,
    /// Byte offset just past the date in the scanned text.
    pub end: usize,
}

/// All valid date tokens in `text`, in order. Tokens that look like dates but
/// name no real day (`31/02/2025`, `5 and 2025`) are skipped.
pub fn find_dates(text: &str) -> Vec<DateToken> {
    DATE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = recognize(&caps)?;
            Some(DateToken {
                value,
                end: whole.end(),
            })
        })
        .collect()
}

/// First valid date token in `text`.
pub fn first_date(text: &str) -> Option<String> {
    find_dates(text).into_iter().next().map(|d| d.value)
}

/// Dates each paired with the parenthetical directly following it, e.g.
/// `23 Sep 2025 (First Stage)`.
pub fn find_labeled_dates(text: &str) -> Vec<(String, Option<String>)> {
    find_dates(text)
        .into_iter()
        .map(|d| {
            let label = LABEL_RE
                .captures(&text[d.end..])
                .map(|c| c[1].trim().to_string())
                .filter(|l| !l.is_empty());
            (d.value, label)
        })
        .collect()
}

fn recognize(caps: &Captures) -> Option<String> {
    if let Some(month) = caps.name("month") {
        let month = month_number(month.as_str())?;
        let day = caps["day"].parse().ok()?;
        let year = caps["year"].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?;
        let raw = caps.get(0)?.as_str();
        return Some(raw.split_whitespace().collect::<Vec<_>>().join(" "));
    }
    if caps.name("iy").is_some() {
        let date = NaiveDate::from_ymd_opt(
            caps["iy"].parse().ok()?,
            caps["im"].parse().ok()?,
            caps["id"].parse().ok()?,
        )?;
        return Some(date.format("%Y-%m-%d").to_string());
    }
    // Slash dates are day/month/year.
    let date = NaiveDate::from_ymd_opt(
        caps["sy"].parse().ok()?,
        caps["sm"].parse().ok()?,
        caps["sd"].parse().ok()?,
    )?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// 1-based month for a full month name or an abbreviation of at least three
/// letters ("Sep", "Sept", "September").
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_name_forms() {
        assert_eq!(first_date("Opening: 06 May 2025").as_deref(), Some("06 May 2025"));
        assert_eq!(first_date("23 September 2025").as_deref(), Some("23 September 2025"));
        assert_eq!(first_date("1 Sept. 2025").as_deref(), Some("1 Sept. 2025"));
    }

    #[test]
    fn iso_form() {
        assert_eq!(first_date("Deadline: 2025-09-23").as_deref(), Some("2025-09-23"));
    }

    #[test]
    fn slash_form_is_day_month_year() {
        assert_eq!(first_date("Deadline: 2/9/2025").as_deref(), Some("2025-09-02"));
        assert_eq!(first_date("23/09/2025").as_deref(), Some("2025-09-23"));
    }

    #[test]
    fn invalid_dates_skipped() {
        assert_eq!(first_date("31/02/2025"), None);
        assert_eq!(first_date("between 5 and 2025"), None);
        assert_eq!(first_date("32 Jan 2025"), None);
        assert_eq!(first_date("no dates here"), None);
    }

    #[test]
    fn labels_follow_dates() {
        let dates =
            find_labeled_dates("Deadline(s): 23 Sep 2025 (First Stage), 14 Apr 2026 (Second Stage)");
        assert_eq!(
            dates,
            vec![
                ("23 Sep 2025".to_string(), Some("First Stage".to_string())),
                ("14 Apr 2026".to_string(), Some("Second Stage".to_string())),
            ]
        );
    }

    #[test]
    fn unlabeled_date() {
        let dates = find_labeled_dates("Deadline(s): 16 Jan 2025 17:00:00 Brussels time");
        assert_eq!(dates, vec![("16 Jan 2025".to_string(), None)]);
    }
}
