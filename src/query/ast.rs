use serde::{Serialize, Deserialize};
use crate::core::types::FieldValue;

/// Range operators and their operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RangeOp {
    Lt { value: FieldValue },
    Lte { value: FieldValue },
    Eq { value: FieldValue },
    Gt { value: FieldValue },
    Gte { value: FieldValue },
    /// Inclusive on both ends. `min <= max` is the caller's responsibility.
    Between { min: FieldValue, max: FieldValue },
}

impl RangeOp {
    pub fn name(&self) -> &'static str {
        match self {
            RangeOp::Lt { .. } => "lt",
            RangeOp::Lte { .. } => "lte",
            RangeOp::Eq { .. } => "eq",
            RangeOp::Gt { .. } => "gt",
            RangeOp::Gte { .. } => "gte",
            RangeOp::Between { .. } => "between",
        }
    }
}

/// A query: leaf conditions on single indexes, joined only by conjunction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Condition {
    All {
        conditions: Vec<Condition>,
    },
    Exact {
        index_name: String,
        value: FieldValue,
    },
    Range {
        index_name: String,
        #[serde(flatten)]
        op: RangeOp,
    },
    Match {
        index_name: String,
        value: String,
    },
    DynamicMatch {
        index_name: String,
        value: String,
    },
    FieldDynamicMatch {
        index_name: String,
        field: String,
        value: String,
    },
}

impl Condition {
    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::All { conditions }
    }

    /// Index the condition targets; `None` for a conjunction.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Condition::All { .. } => None,
            Condition::Exact { index_name, .. }
            | Condition::Range { index_name, .. }
            | Condition::Match { index_name, .. }
            | Condition::DynamicMatch { index_name, .. }
            | Condition::FieldDynamicMatch { index_name, .. } => Some(index_name),
        }
    }

    /// Number of leaf conditions in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Condition::All { conditions } => conditions.iter().map(Condition::leaf_count).sum(),
            _ => 1,
        }
    }
}
