use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::normalize::content_lines;

/// Topic identifier at the start of a line.
pub(crate) static TOPIC_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(HORIZON-[A-Za-z0-9\-]+)").unwrap());
/// `<identifier>: <title>` header line.
pub(crate) static TOPIC_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(HORIZON-[A-Za-z0-9\-]+):\s*(.*)$").unwrap());
/// Identifier alone on its line, the title wrapped onto the next one.
static BARE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^HORIZON-[A-Z0-9\-]+:?$").unwrap());

/// Lines after a header searched for structural markers.
pub const LOOKAHEAD_LINES: usize = 19;
const TOPIC_MARKERS: &[&str] = &["call:", "type of action"];
const DESTINATION_BOILERPLATE: &str = "this destination";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicBlock {
    pub code: String,
    pub title: String,
    pub full_text: String,
}

struct TopicStart {
    line: usize,
    code: String,
    title: String,
}

/// Slice normalized document text into per-topic blocks, in document order.
pub fn segment_topics(text: &str) -> Vec<TopicBlock> {
    let lines = merge_wrapped_codes(&content_lines(text));
    let starts = find_topic_starts(&lines);

    let blocks: Vec<TopicBlock> = starts
        .iter()
        .enumerate()
        .map(|(idx, start)| {
            let next = starts.get(idx + 1).map_or(lines.len(), |s| s.line);
            let end = (start.line + 1..next)
                .find(|&j| lines[j].to_lowercase().starts_with(DESTINATION_BOILERPLATE))
                .unwrap_or(next);
            TopicBlock {
                code: start.code.clone(),
                title: start.title.clone(),
                full_text: lines[start.line..end].join("\n").trim().to_string(),
            }
        })
        .collect();

    debug!(lines = lines.len(), topics = blocks.len(), "segmented topics");
    blocks
}

/// Join an identifier-only line with the line after it. Strictly pairwise:
/// the absorbed line is never itself considered for merging.
fn merge_wrapped_codes(lines: &[&str]) -> Vec<String> {
    let mut merged = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        if BARE_CODE_RE.is_match(lines[i]) && i + 1 < lines.len() {
            merged.push(format!("{} {}", lines[i], lines[i + 1]));
            i += 2;
        } else {
            merged.push(lines[i].to_string());
            i += 1;
        }
    }
    merged
}

/// Header lines followed within the lookahead window by a "call:" or
/// "type of action" marker. Cross-references in running prose match the
/// header pattern too but have no such markers nearby.
fn find_topic_starts(lines: &[String]) -> Vec<TopicStart> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| {
            let caps = TOPIC_LINE_RE.captures(line)?;
            let window_end = (i + 1 + LOOKAHEAD_LINES).min(lines.len());
            let lookahead = lines[i + 1..window_end].join("\n").to_lowercase();
            if !TOPIC_MARKERS.iter().any(|m| lookahead.contains(m)) {
                debug!(line = %line, "identifier without topic markers, skipped");
                return None;
            }
            Some(TopicStart {
                line: i,
                code: caps[1].to_string(),
                title: caps[2].trim().to_string(),
            })
        })
        .collect()
}

// ── Tests ──
