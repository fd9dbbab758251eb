use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::dates::{find_labeled_dates, first_date};
use super::normalize::content_lines;
use super::topics::TOPIC_CODE_RE;

/// "Opening:", "Opens:", "Opening date:" ...
static OPENING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^open(?:ing|s)\b[^:]{0,40}:").unwrap());
/// Deadline label inside an opening line, "Opening: 06 May 2025 Deadline(s): ...".
static INLINE_DEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:deadline|cut[- ]off)").unwrap());

const DEADLINE_PREFIXES: &[&str] = &["deadline", "cut-off", "cut off"];
const DESTINATION_PREFIX: &str = "destination";

/// Opening / deadline / destination values shared by the topics that follow
/// one header group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    pub opening_date: Option<String>,
    pub deadline1: Option<String>,
    pub deadline1_label: Option<String>,
    pub deadline2: Option<String>,
    pub deadline2_label: Option<String>,
    pub destination: Option<String>,
}

impl MetadataBlock {
    /// First two dates fill the deadline slots; an empty list changes nothing.
    fn set_deadlines(&mut self, dates: Vec<LabeledDate>) {
        let mut dates = dates.into_iter();
        if let Some((date, label)) = dates.next() {
            self.deadline1 = Some(date);
            self.deadline1_label = label;
        }
        if let Some((date, label)) = dates.next() {
            self.deadline2 = Some(date);
            self.deadline2_label = label;
        }
    }
}

/// Result of one association pass.
#[derive(Debug, Clone, Default)]
pub struct Associations {
    /// Snapshot recorded at each topic-code sighting. Last write wins.
    pub by_code: HashMap<String, MetadataBlock>,
    /// Header groups that never reached a topic code before being replaced
    /// by the next group (or the end of the document).
    pub orphaned_groups: usize,
}

#[derive(Debug, PartialEq)]
enum MetaLine<'a> {
    Opening {
        date: Option<String>,
        deadlines: Vec<LabeledDate>,
    },
    Deadlines(Vec<LabeledDate>),
    Destination(&'a str),
    TopicCode(&'a str),
    Other,
}

type LabeledDate = (String, Option<String>);

fn classify(line: &str) -> MetaLine<'_> {
    if OPENING_RE.is_match(line) {
        return match INLINE_DEADLINE_RE.find(line) {
            Some(m) => MetaLine::Opening {
                date: first_date(&line[..m.start()]),
                deadlines: find_labeled_dates(&line[m.start()..]),
            },
            None => MetaLine::Opening {
                date: first_date(line),
                deadlines: Vec::new(),
            },
        };
    }
    let lower = line.to_lowercase();
    if DEADLINE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return MetaLine::Deadlines(find_labeled_dates(line));
    }
    if lower.starts_with(DESTINATION_PREFIX) {
        if let Some((_, rest)) = line.split_once(':') {
            return MetaLine::Destination(rest.trim());
        }
    }
    if let Some(caps) = TOPIC_CODE_RE.captures(line) {
        if let Some(code) = caps.get(1) {
            return MetaLine::TopicCode(code.as_str());
        }
    }
    MetaLine::Other
}

/// Scanner state between lines. `current` is `None` until the first opening
/// header; after that the scan is collecting.
#[derive(Debug, Default)]
struct ScanState {
    current: Option<MetadataBlock>,
    codes_in_group: usize,
    orphaned_groups: usize,
}

type Emission = Option<(String, MetadataBlock)>;

impl ScanState {
    /// One reducer step: consume a line, return the next state and the
    /// snapshot to record, if the line names a topic code.
    fn step(self, line: &str) -> (ScanState, Emission) {
        let ScanState {
            current,
            codes_in_group,
            orphaned_groups,
        } = self;

        match (classify(line), current) {
            (MetaLine::Opening { date, deadlines }, prev) => {
                let orphaned = prev.is_some() && codes_in_group == 0;
                // Destination outlives the group; only opening and deadlines reset.
                let destination = prev.and_then(|p| p.destination);
                let mut next = MetadataBlock {
                    opening_date: date,
                    destination,
                    ..MetadataBlock::default()
                };
                next.set_deadlines(deadlines);
                (
                    ScanState {
                        current: Some(next),
                        codes_in_group: 0,
                        orphaned_groups: orphaned_groups + usize::from(orphaned),
                    },
                    None,
                )
            }
            (MetaLine::Deadlines(dates), Some(mut block)) => {
                block.set_deadlines(dates);
                (
                    ScanState {
                        current: Some(block),
                        codes_in_group,
                        orphaned_groups,
                    },
                    None,
                )
            }
            (MetaLine::Destination(dest), Some(mut block)) => {
                block.destination = Some(dest.to_string()).filter(|d| !d.is_empty());
                (
                    ScanState {
                        current: Some(block),
                        codes_in_group,
                        orphaned_groups,
                    },
                    None,
                )
            }
            (MetaLine::TopicCode(code), Some(block)) => {
                let snapshot = (code.to_string(), block.clone());
                (
                    ScanState {
                        current: Some(block),
                        codes_in_group: codes_in_group + 1,
                        orphaned_groups,
                    },
                    Some(snapshot),
                )
            }
            (_, current) => (
                ScanState {
                    current,
                    codes_in_group,
                    orphaned_groups,
                },
                None,
            ),
        }
    }

    fn finish(self) -> usize {
        let trailing = self.current.is_some() && self.codes_in_group == 0;
        self.orphaned_groups + usize::from(trailing)
    }
}

/// Associate every topic code with the header group that precedes it.
pub fn associate_metadata(text: &str) -> Associations {
    let (state, by_code) = content_lines(text).into_iter().fold(
        (ScanState::default(), HashMap::new()),
        |(state, mut by_code), line| {
            let (state, emission) = state.step(line);
            if let Some((code, snapshot)) = emission {
                by_code.insert(code, snapshot);
            }
            (state, by_code)
        },
    );

    let associations = Associations {
        by_code,
        orphaned_groups: state.finish(),
    };
    debug!(
        codes = associations.by_code.len(),
        orphaned = associations.orphaned_groups,
        "associated metadata"
    );
    associations
}

// ── Tests ──
