pub mod calls;
pub mod dates;
pub mod extract;
pub mod metadata;
pub mod normalize;
pub mod record;
pub mod topics;

use std::collections::HashSet;

use tracing::{debug, info, warn};

use calls::{call_key, CallSchedule};
use record::{Provenance, Record};

/// Pipeline: raw text → normalized text → {topic blocks ‖ metadata ‖ call
/// schedule} → per-topic fields → one record per topic, in document order.
pub fn parse_document(raw: &str, provenance: &Provenance) -> Vec<Record> {
    let text = normalize::normalize_text(raw);

    let ((blocks, associations), schedule) = rayon::join(
        || {
            rayon::join(
                || topics::segment_topics(&text),
                || metadata::associate_metadata(&text),
            )
        },
        || calls::scan_call_schedule(&text),
    );

    if associations.orphaned_groups > 0 {
        warn!(
            source = %provenance.source,
            groups = associations.orphaned_groups,
            "opening/deadline groups not followed by any topic code"
        );
    }

    let records = record::assemble_records(&blocks, &associations.by_code, provenance);

    let without_metadata = blocks
        .iter()
        .filter(|b| !associations.by_code.contains_key(&b.code))
        .count();
    let unscheduled = unscheduled_calls(&records, &schedule);
    info!(
        source = %provenance.source,
        topics = records.len(),
        without_metadata,
        calls = schedule.len(),
        "parsed document"
    );
    if !unscheduled.is_empty() {
        debug!(
            count = unscheduled.len(),
            sample = ?unscheduled.iter().take(5).collect::<Vec<_>>(),
            "topic call names with no matching call schedule"
        );
    }

    records
}

/// Call-level opening/deadline rows of a raw document.
pub fn call_schedule(raw: &str) -> Vec<CallSchedule> {
    calls::scan_call_schedule(&normalize::normalize_text(raw))
}

/// Distinct record call names absent from the schedule's call names.
fn unscheduled_calls(records: &[Record], schedule: &[CallSchedule]) -> Vec<String> {
    let scheduled: HashSet<String> = schedule
        .iter()
        .filter_map(|s| s.call_name.as_deref().map(call_key))
        .collect();
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| r.call.as_deref().map(call_key))
        .filter(|key| !scheduled.contains(key) && seen.insert(key.clone()))
        .collect()
}

// ── Tests ──
