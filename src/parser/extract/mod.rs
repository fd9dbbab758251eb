pub mod budget;
pub mod labels;
pub mod sections;
pub mod trl;

use tracing::trace;

use super::normalize::normalize_text;

/// Fields pulled out of one topic block. Each is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub budget_per_project: Option<u64>,
    pub indicative_total_budget: Option<u64>,
    pub type_of_action: Option<String>,
    pub trl: Option<String>,
    pub expected_outcome: Option<String>,
    pub scope: Option<String>,
    pub call: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    BudgetPerProject,
    IndicativeTotalBudget,
    TypeOfAction,
    Trl,
    ExpectedOutcome,
    Scope,
    Call,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::BudgetPerProject => "budget_per_project",
            Field::IndicativeTotalBudget => "indicative_total_budget",
            Field::TypeOfAction => "type_of_action",
            Field::Trl => "trl",
            Field::ExpectedOutcome => "expected_outcome",
            Field::Scope => "scope",
            Field::Call => "call",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Amount(u64),
    Text(String),
}

/// A named, pure extraction rule over normalized block text.
pub struct FieldRule {
    pub field: Field,
    pub extract: fn(&str) -> Option<FieldValue>,
}

/// Every rule applied to a topic block. Order does not matter.
pub static RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Title,
        extract: |t| labels::title(t).map(FieldValue::Text),
    },
    FieldRule {
        field: Field::BudgetPerProject,
        extract: |t| budget::per_project(t).map(FieldValue::Amount),
    },
    FieldRule {
        field: Field::IndicativeTotalBudget,
        extract: |t| budget::indicative_total(t).map(FieldValue::Amount),
    },
    FieldRule {
        field: Field::TypeOfAction,
        extract: |t| labels::type_of_action(t).map(FieldValue::Text),
    },
    FieldRule {
        field: Field::Trl,
        extract: |t| trl::trl(t).map(FieldValue::Text),
    },
    FieldRule {
        field: Field::ExpectedOutcome,
        extract: |t| sections::expected_outcome(t).map(FieldValue::Text),
    },
    FieldRule {
        field: Field::Scope,
        extract: |t| sections::scope(t).map(FieldValue::Text),
    },
    FieldRule {
        field: Field::Call,
        extract: |t| labels::call_name(t).map(FieldValue::Text),
    },
];

impl ExtractedFields {
    fn set(&mut self, field: Field, value: FieldValue) {
        match (field, value) {
            (Field::BudgetPerProject, FieldValue::Amount(v)) => self.budget_per_project = Some(v),
            (Field::IndicativeTotalBudget, FieldValue::Amount(v)) => {
                self.indicative_total_budget = Some(v)
            }
            (Field::Title, FieldValue::Text(s)) => self.title = Some(s),
            (Field::TypeOfAction, FieldValue::Text(s)) => self.type_of_action = Some(s),
            (Field::Trl, FieldValue::Text(s)) => self.trl = Some(s),
            (Field::ExpectedOutcome, FieldValue::Text(s)) => self.expected_outcome = Some(s),
            (Field::Scope, FieldValue::Text(s)) => self.scope = Some(s),
            (Field::Call, FieldValue::Text(s)) => self.call = Some(s),
            (field, value) => trace!(field = field.name(), ?value, "value kind does not fit field"),
        }
    }
}

/// Apply the rule registry to one topic block.
pub fn extract_fields(block_text: &str) -> ExtractedFields {
    let text = normalize_text(block_text);
    let mut fields = ExtractedFields::default();
    for rule in RULES {
        match (rule.extract)(&text) {
            Some(value) => fields.set(rule.field, value),
            None => trace!(field = rule.field.name(), "no match"),
        }
    }
    fields
}

// ── Tests ──
