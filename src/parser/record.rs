use std::collections::HashMap;

use serde::Serialize;

use super::extract::{extract_fields, ExtractedFields};
use super::metadata::MetadataBlock;
use super::topics::TopicBlock;

/// Caller-supplied values attached verbatim to every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    pub source: String,
    pub version: String,
    pub parsed_at: String,
}

/// One output row per topic. Field order is the fixed column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub code: String,
    pub title: Option<String>,
    pub budget_per_project: Option<u64>,
    pub indicative_total_budget: Option<u64>,
    pub number_of_projects: Option<u64>,
    pub type_of_action: Option<String>,
    pub trl: Option<String>,
    pub call: Option<String>,
    pub expected_outcome: Option<String>,
    pub scope: Option<String>,
    pub opening_date: Option<String>,
    pub deadline1: Option<String>,
    pub deadline1_label: Option<String>,
    pub deadline2: Option<String>,
    pub deadline2_label: Option<String>,
    pub destination: Option<String>,
    pub description: String,
    pub source: String,
    pub version: String,
    pub parsed_at: String,
}

pub const COLUMNS: [&str; 20] = [
    "code",
    "title",
    "budget_per_project",
    "indicative_total_budget",
    "number_of_projects",
    "type_of_action",
    "trl",
    "call",
    "expected_outcome",
    "scope",
    "opening_date",
    "deadline1",
    "deadline1_label",
    "deadline2",
    "deadline2_label",
    "destination",
    "description",
    "source",
    "version",
    "parsed_at",
];

impl Record {
    pub fn assemble(
        block: &TopicBlock,
        fields: ExtractedFields,
        metadata: MetadataBlock,
        provenance: &Provenance,
    ) -> Self {
        let title = fields
            .title
            .or_else(|| Some(block.title.clone()).filter(|t| !t.is_empty()));
        Record {
            code: block.code.clone(),
            title,
            budget_per_project: fields.budget_per_project,
            indicative_total_budget: fields.indicative_total_budget,
            number_of_projects: number_of_projects(
                fields.budget_per_project,
                fields.indicative_total_budget,
            ),
            type_of_action: fields.type_of_action,
            trl: fields.trl,
            call: fields.call,
            expected_outcome: fields.expected_outcome,
            scope: fields.scope,
            opening_date: metadata.opening_date,
            deadline1: metadata.deadline1,
            deadline1_label: metadata.deadline1_label,
            deadline2: metadata.deadline2,
            deadline2_label: metadata.deadline2_label,
            destination: metadata.destination,
            description: block.full_text.clone(),
            source: provenance.source.clone(),
            version: provenance.version.clone(),
            parsed_at: provenance.parsed_at.clone(),
        }
    }

    /// Cells in `COLUMNS` order; unset fields are `None`.
    pub fn cells(&self) -> Vec<Option<String>> {
        let amount = |v: Option<u64>| v.map(|n| n.to_string());
        vec![
            Some(self.code.clone()),
            self.title.clone(),
            amount(self.budget_per_project),
            amount(self.indicative_total_budget),
            amount(self.number_of_projects),
            self.type_of_action.clone(),
            self.trl.clone(),
            self.call.clone(),
            self.expected_outcome.clone(),
            self.scope.clone(),
            self.opening_date.clone(),
            self.deadline1.clone(),
            self.deadline1_label.clone(),
            self.deadline2.clone(),
            self.deadline2_label.clone(),
            self.destination.clone(),
            Some(self.description.clone()),
            Some(self.source.clone()),
            Some(self.version.clone()),
            Some(self.parsed_at.clone()),
        ]
    }
}

/// floor(total / per_project) when both are known and per_project is nonzero.
pub fn number_of_projects(per_project: Option<u64>, total: Option<u64>) -> Option<u64> {
    match (per_project, total) {
        (Some(per), Some(total)) if per > 0 => Some(total / per),
        _ => None,
    }
}

/// One record per block in block order. Codes missing from `metadata` get
/// an all-unset metadata block.
pub fn assemble_records(
    blocks: &[TopicBlock],
    metadata: &HashMap<String, MetadataBlock>,
    provenance: &Provenance,
) -> Vec<Record> {
    blocks
        .iter()
        .map(|block| {
            let fields = extract_fields(&block.full_text);
            let meta = metadata.get(&block.code).cloned().unwrap_or_default();
            Record::assemble(block, fields, meta, provenance)
        })
        .collect()
}

// ── Tests ──
