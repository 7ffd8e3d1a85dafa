use crate::core::error::{Error, Result};
use crate::core::types::FieldValue;
use crate::query::ast::{Condition, RangeOp};
use crate::schema::mapping::MappingKind;
use crate::schema::schema::CollectionSchema;

/// Hands out the operators valid for each index of one schema. Built once per
/// schema; every lookup is checked against the mappings before anything
/// reaches the network.
pub struct QueryBuilder<'a> {
    schema: &'a CollectionSchema,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(schema: &'a CollectionSchema) -> Self {
        QueryBuilder { schema }
    }

    /// Operators of any index. Fails if the collection has no such index.
    pub fn index(&self, index_name: &str) -> Result<IndexOperators> {
        let mapping = self
            .schema
            .mapping(index_name)
            .ok_or_else(|| Error::unknown_index(self.schema.name(), index_name))?;

        Ok(IndexOperators {
            collection: self.schema.name().to_string(),
            index_name: index_name.to_string(),
            kind: mapping.kind(),
        })
    }

    pub fn exact(&self, index_name: &str) -> Result<ExactOperators> {
        self.index(index_name)?.as_exact()
    }

    pub fn range(&self, index_name: &str) -> Result<RangeOperators> {
        self.index(index_name)?.as_range()
    }

    pub fn match_index(&self, index_name: &str) -> Result<MatchOperators> {
        self.index(index_name)?.as_match()
    }

    pub fn dynamic_match(&self, index_name: &str) -> Result<DynamicMatchOperators> {
        self.index(index_name)?.as_dynamic_match()
    }

    pub fn field_dynamic_match(&self, index_name: &str) -> Result<FieldDynamicMatchOperators> {
        self.index(index_name)?.as_field_dynamic_match()
    }

    pub fn all(&self, conditions: Vec<Condition>) -> Condition {
        Condition::all(conditions)
    }
}

/// An index whose kind is known only at runtime. Each operator checks the
/// kind and fails naming the operator if the index does not support it.
#[derive(Debug, Clone)]
pub struct IndexOperators {
    collection: String,
    index_name: String,
    kind: MappingKind,
}

impl IndexOperators {
    pub fn kind(&self) -> MappingKind {
        self.kind
    }

    fn reject(&self, operator: &str) -> Error {
        Error::invalid_operator(&self.collection, &self.index_name, operator, self.kind.as_str())
    }

    fn require(&self, kind: MappingKind, operator: &str) -> Result<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(self.reject(operator))
        }
    }

    pub fn as_exact(&self) -> Result<ExactOperators> {
        self.require(MappingKind::Exact, "eq")?;
        Ok(ExactOperators { index_name: self.index_name.clone() })
    }

    pub fn as_range(&self) -> Result<RangeOperators> {
        self.require(MappingKind::Range, "lt/lte/eq/gt/gte/between")?;
        Ok(RangeOperators { index_name: self.index_name.clone() })
    }

    pub fn as_match(&self) -> Result<MatchOperators> {
        self.require(MappingKind::Match, "match")?;
        Ok(MatchOperators { index_name: self.index_name.clone() })
    }

    pub fn as_dynamic_match(&self) -> Result<DynamicMatchOperators> {
        self.require(MappingKind::DynamicMatch, "match")?;
        Ok(DynamicMatchOperators { index_name: self.index_name.clone() })
    }

    pub fn as_field_dynamic_match(&self) -> Result<FieldDynamicMatchOperators> {
        self.require(MappingKind::FieldDynamicMatch, "match")?;
        Ok(FieldDynamicMatchOperators { index_name: self.index_name.clone() })
    }

    /// Equality, on exact and range indexes.
    pub fn eq(&self, value: impl Into<FieldValue>) -> Result<Condition> {
        match self.kind {
            MappingKind::Exact => Ok(self.as_exact()?.eq(value)),
            MappingKind::Range => Ok(self.as_range()?.eq(value)),
            _ => Err(self.reject("eq")),
        }
    }

    pub fn lt(&self, value: impl Into<FieldValue>) -> Result<Condition> {
        self.require(MappingKind::Range, "lt")?;
        Ok(self.as_range()?.lt(value))
    }

    pub fn lte(&self, value: impl Into<FieldValue>) -> Result<Condition> {
        self.require(MappingKind::Range, "lte")?;
        Ok(self.as_range()?.lte(value))
    }

    pub fn gt(&self, value: impl Into<FieldValue>) -> Result<Condition> {
        self.require(MappingKind::Range, "gt")?;
        Ok(self.as_range()?.gt(value))
    }

    pub fn gte(&self, value: impl Into<FieldValue>) -> Result<Condition> {
        self.require(MappingKind::Range, "gte")?;
        Ok(self.as_range()?.gte(value))
    }

    pub fn between(&self, min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Result<Condition> {
        self.require(MappingKind::Range, "between")?;
        Ok(self.as_range()?.between(min, max))
    }

    /// Full-text match, on match and dynamic-match indexes.
    pub fn matches(&self, value: &str) -> Result<Condition> {
        match self.kind {
            MappingKind::Match => Ok(self.as_match()?.matches(value)),
            MappingKind::DynamicMatch => Ok(self.as_dynamic_match()?.matches(value)),
            _ => Err(self.reject("match")),
        }
    }

    /// Field-scoped match, on field-dynamic-match indexes.
    pub fn matches_field(&self, field: &str, value: &str) -> Result<Condition> {
        self.require(MappingKind::FieldDynamicMatch, "match(field, value)")?;
        Ok(self.as_field_dynamic_match()?.matches(field, value))
    }
}

pub struct ExactOperators {
    index_name: String,
}

impl ExactOperators {
    pub fn eq(&self, value: impl Into<FieldValue>) -> Condition {
        Condition::Exact {
            index_name: self.index_name.clone(),
            value: value.into(),
        }
    }
}

pub struct RangeOperators {
    index_name: String,
}

impl RangeOperators {
    fn condition(&self, op: RangeOp) -> Condition {
        Condition::Range {
            index_name: self.index_name.clone(),
            op,
        }
    }

    pub fn lt(&self, value: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Lt { value: value.into() })
    }

    pub fn lte(&self, value: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Lte { value: value.into() })
    }

    pub fn eq(&self, value: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Eq { value: value.into() })
    }

    pub fn gt(&self, value: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Gt { value: value.into() })
    }

    pub fn gte(&self, value: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Gte { value: value.into() })
    }

    pub fn between(&self, min: impl Into<FieldValue>, max: impl Into<FieldValue>) -> Condition {
        self.condition(RangeOp::Between {
            min: min.into(),
            max: max.into(),
        })
    }
}

pub struct MatchOperators {
    index_name: String,
}

impl MatchOperators {
    pub fn matches(&self, value: &str) -> Condition {
        Condition::Match {
            index_name: self.index_name.clone(),
            value: value.to_string(),
        }
    }
}

pub struct DynamicMatchOperators {
    index_name: String,
}

impl DynamicMatchOperators {
    pub fn matches(&self, value: &str) -> Condition {
        Condition::DynamicMatch {
            index_name: self.index_name.clone(),
            value: value.to_string(),
        }
    }
}

pub struct FieldDynamicMatchOperators {
    index_name: String,
}

impl FieldDynamicMatchOperators {
    pub fn matches(&self, field: &str, value: &str) -> Condition {
        Condition::FieldDynamicMatch {
            index_name: self.index_name.clone(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
