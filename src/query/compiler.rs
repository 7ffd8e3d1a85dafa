use std::collections::BTreeMap;
use tracing::debug;
use crate::analysis::pipeline::TextPipeline;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::FieldValue;
use crate::crypto::materials::CipherCache;
use crate::encoding::term::{encode_equatable, encode_equatable_str, encode_orderable, SourceType};
use crate::index::analyzer::scoped_token;
use crate::query::ast::{Condition, RangeOp};
use crate::query::constraint::{ConstraintBody, TermConstraint, WireConstraint};
use crate::schema::definition::FieldType;
use crate::schema::mapping::MappingKind;
use crate::schema::meta::IndexMeta;
use crate::schema::schema::CollectionSchema;

struct CompiledIndex {
    kind: MappingKind,
    field_type: Option<FieldType>,
    meta: IndexMeta,
    pipeline: Option<TextPipeline>,
}

/// Turns condition trees into flat constraint lists. Text pipelines for the
/// match-style indexes are built once, up front.
pub struct QueryCompiler {
    collection: String,
    indexes: BTreeMap<String, CompiledIndex>,
}

impl QueryCompiler {
    pub fn new(schema: &CollectionSchema) -> Self {
        let indexes = schema
            .indexes()
            .map(|(name, mapping, meta)| {
                (
                    name.to_string(),
                    CompiledIndex {
                        kind: mapping.kind(),
                        field_type: mapping.field_type(),
                        meta: meta.clone(),
                        pipeline: mapping.options().map(TextPipeline::from_options),
                    },
                )
            })
            .collect();

        QueryCompiler {
            collection: schema.name().to_string(),
            indexes,
        }
    }

    /// Plaintext constraints. A conjunction becomes the concatenation of its
    /// children; match conditions expand to one constraint per query token.
    pub fn plan(&self, condition: &Condition) -> Result<Vec<TermConstraint>> {
        let mut out = Vec::new();
        self.plan_into(condition, &mut out)?;
        Ok(out)
    }

    /// [`plan`](Self::plan), then every term and bound through its index's
    /// cipher.
    pub fn compile(&self, condition: &Condition, ciphers: &mut CipherCache) -> Result<Vec<WireConstraint>> {
        let planned = self.plan(condition)?;

        let constraints = planned
            .iter()
            .map(|constraint| {
                let index = self
                    .indexes
                    .values()
                    .find(|index| index.meta.index_id == constraint.index_id)
                    .ok_or_else(|| {
                        Error::new(
                            ErrorKind::InvalidState,
                            format!("planned constraint for unknown index {}", constraint.index_id),
                        )
                    })?;
                let cipher = ciphers.cipher_for(&index.meta)?;
                constraint.encrypt(cipher.as_ref())
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            collection = %self.collection,
            conditions = condition.leaf_count(),
            constraints = constraints.len(),
            "compiled query"
        );
        Ok(constraints)
    }

    fn index(&self, index_name: &str, expected: MappingKind, operator: &str) -> Result<&CompiledIndex> {
        let index = self
            .indexes
            .get(index_name)
            .ok_or_else(|| Error::unknown_index(&self.collection, index_name))?;

        if index.kind != expected {
            return Err(Error::invalid_operator(
                &self.collection,
                index_name,
                operator,
                index.kind.as_str(),
            ));
        }
        Ok(index)
    }

    fn plan_into(&self, condition: &Condition, out: &mut Vec<TermConstraint>) -> Result<()> {
        match condition {
            Condition::All { conditions } => {
                for child in conditions {
                    self.plan_into(child, out)?;
                }
            }
            Condition::Exact { index_name, value } => {
                let index = self.index(index_name, MappingKind::Exact, "eq")?;
                let term = encode_equatable(value)
                    .and_then(|term| {
                        check_operand(self.source_type(index_name, index)?, term.source_type)?;
                        Ok(term)
                    })
                    .map_err(|e| self.in_index(index_name, e))?;
                out.push(TermConstraint::exact(index.meta.index_id, term.equatable));
            }
            Condition::Range { index_name, op } => {
                let index = self.index(index_name, MappingKind::Range, op.name())?;
                let (lower, upper) = self
                    .source_type(index_name, index)
                    .and_then(|source_type| range_bounds(op, source_type))
                    .map_err(|e| self.in_index(index_name, e))?;
                out.push(TermConstraint::range(index.meta.index_id, lower, upper));
            }
            Condition::Match { index_name, value } => {
                let index = self.index(index_name, MappingKind::Match, "match")?;
                push_tokens(index, tokens(index, value), out);
            }
            Condition::DynamicMatch { index_name, value } => {
                let index = self.index(index_name, MappingKind::DynamicMatch, "match")?;
                push_tokens(index, tokens(index, value), out);
            }
            Condition::FieldDynamicMatch { index_name, field, value } => {
                let index = self.index(index_name, MappingKind::FieldDynamicMatch, "match")?;
                let scoped = tokens(index, value)
                    .iter()
                    .map(|token| scoped_token(field, token))
                    .collect();
                push_tokens(index, scoped, out);
            }
        }
        Ok(())
    }

    fn source_type(&self, index_name: &str, index: &CompiledIndex) -> Result<SourceType> {
        index.field_type.map(|t| t.source_type()).ok_or_else(|| {
            Error::schema(format!(
                "{} index '{}' of collection '{}' declares no field type",
                index.kind, index_name, self.collection
            ))
        })
    }

    fn in_index(&self, index_name: &str, e: Error) -> Error {
        Error::new(
            e.kind,
            format!("index '{}' of collection '{}': {}", index_name, self.collection, e.context),
        )
    }
}

fn check_operand(expected: SourceType, found: SourceType) -> Result<()> {
    if expected != found {
        return Err(Error::encoding(format!(
            "cannot compare a {} value with {} terms",
            found, expected
        )));
    }
    Ok(())
}

fn tokens(index: &CompiledIndex, value: &str) -> Vec<String> {
    match &index.pipeline {
        Some(pipeline) => pipeline.analyze(value),
        None => unreachable!("match-style index without a text pipeline"),
    }
}

fn push_tokens(index: &CompiledIndex, tokens: Vec<String>, out: &mut Vec<TermConstraint>) {
    out.extend(
        tokens
            .iter()
            .map(|token| TermConstraint::exact(index.meta.index_id, encode_equatable_str(token).equatable)),
    );
}

/// Inclusive `(lower, upper)` bounds of a range operator over the u64 term
/// domain. Strict comparisons saturate at the domain edges. Every operand
/// must encode to `source_type`.
pub fn range_bounds(op: &RangeOp, source_type: SourceType) -> Result<(u64, u64)> {
    let orderable = |value: &FieldValue| -> Result<u64> {
        let term = encode_orderable(value)?;
        check_operand(source_type, term.source_type)?;
        Ok(term.orderable)
    };

    Ok(match op {
        RangeOp::Lt { value } => (0, orderable(value)?.saturating_sub(1)),
        RangeOp::Lte { value } => (0, orderable(value)?),
        RangeOp::Eq { value } => {
            let term = orderable(value)?;
            (term, term)
        }
        RangeOp::Gt { value } => (orderable(value)?.saturating_add(1), u64::MAX),
        RangeOp::Gte { value } => (orderable(value)?, u64::MAX),
        RangeOp::Between { min, max } => (orderable(min)?, orderable(max)?),
    })
}

/// Whether a planned constraint is an equality or a range.
pub fn is_range(constraint: &TermConstraint) -> bool {
    matches!(constraint.body, ConstraintBody::Range { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::config::MatchOptions;
    use crate::query::builder::QueryBuilder;

    fn schema() -> CollectionSchema {
        CollectionSchema::define("users")
            .exact("email", "email", FieldType::String)
            .range("age", "age", FieldType::Number)
            .match_fields("name", &["name"], MatchOptions::standard_downcase())
            .field_dynamic_match("scoped", MatchOptions::standard_downcase())
            .build()
            .unwrap()
    }

    fn big(n: u64) -> RangeOp {
        RangeOp::Lt { value: FieldValue::Integer(n as i128) }
    }

    #[test]
    fn test_lt_zero_saturates() {
        assert_eq!(range_bounds(&big(0), SourceType::BigInt).unwrap(), (0, 0));
    }

    #[test]
    fn test_gt_max_saturates() {
        let op = RangeOp::Gt { value: FieldValue::Integer(u64::MAX as i128) };
        assert_eq!(range_bounds(&op, SourceType::BigInt).unwrap(), (u64::MAX, u64::MAX));
    }

    #[test]
    fn test_bounds_per_operator() {
        let v = || FieldValue::Integer(10);
        assert_eq!(range_bounds(&big(10), SourceType::BigInt).unwrap(), (0, 9));
        assert_eq!(range_bounds(&RangeOp::Lte { value: v() }, SourceType::BigInt).unwrap(), (0, 10));
        assert_eq!(range_bounds(&RangeOp::Eq { value: v() }, SourceType::BigInt).unwrap(), (10, 10));
        assert_eq!(range_bounds(&RangeOp::Gt { value: v() }, SourceType::BigInt).unwrap(), (11, u64::MAX));
        assert_eq!(range_bounds(&RangeOp::Gte { value: v() }, SourceType::BigInt).unwrap(), (10, u64::MAX));
        assert_eq!(
            range_bounds(&RangeOp::Between { min: FieldValue::Integer(20), max: FieldValue::Integer(3) }, SourceType::BigInt).unwrap(),
            (20, 3)
        );
    }

    #[test]
    fn test_operand_of_other_source_type_rejected() {
        let op = RangeOp::Gt { value: FieldValue::Number(5.0) };
        let err = range_bounds(&op, SourceType::BigInt).unwrap_err();
        assert!(err.is(ErrorKind::Encoding));
        assert!(err.context.contains("cannot compare a number value with bigint terms"));
    }

    #[test]
    fn test_bigint_query_on_number_index_rejected() {
        let schema = schema();
        let compiler = QueryCompiler::new(&schema);
        let q = QueryBuilder::new(&schema);

        let err = compiler.plan(&q.range("age").unwrap().gt(5i64)).unwrap_err();
        assert!(err.is(ErrorKind::Encoding));
        assert!(err.context.contains("index 'age' of collection 'users'"));
        assert!(err.context.contains("bigint"));

        let between = q.range("age").unwrap().between(1.0, 5i64);
        assert!(compiler.plan(&between).unwrap_err().is(ErrorKind::Encoding));

        let err = compiler.plan(&q.exact("email").unwrap().eq(36.0)).unwrap_err();
        assert!(err.context.contains("index 'email'"));

        assert!(compiler.plan(&q.range("age").unwrap().gt(5.0)).is_ok());
    }

    #[test]
    fn test_conjunction_flattens() {
        let schema = schema();
        let q = QueryBuilder::new(&schema);
        let condition = q.all(vec![
            q.exact("email").unwrap().eq("ada@example.com"),
            q.all(vec![
                q.range("age").unwrap().gte(18.0),
                q.match_index("name").unwrap().matches("Ada Lovelace"),
            ]),
        ]);

        let planned = QueryCompiler::new(&schema).plan(&condition).unwrap();
        assert_eq!(planned.len(), 4);
        assert!(!is_range(&planned[0]));
        assert!(is_range(&planned[1]));
        assert_eq!(planned[2], TermConstraint::exact(schema.index_id("name").unwrap(), encode_equatable_str("ada").equatable));
    }

    #[test]
    fn test_field_dynamic_match_scopes_query_tokens() {
        let schema = schema();
        let condition = QueryBuilder::new(&schema)
            .field_dynamic_match("scoped")
            .unwrap()
            .matches("title", "Hello");
        let planned = QueryCompiler::new(&schema).plan(&condition).unwrap();
        assert_eq!(
            planned,
            vec![TermConstraint::exact(
                schema.index_id("scoped").unwrap(),
                encode_equatable_str("title:hello").equatable
            )]
        );
    }

    #[test]
    fn test_mismatched_condition_rejected() {
        let schema = schema();
        let condition = Condition::Match { index_name: "email".into(), value: "ada".into() };
        let err = QueryCompiler::new(&schema).plan(&condition).unwrap_err();
        assert!(err.is(ErrorKind::InvalidOperator));

        let condition = Condition::Exact { index_name: "nickname".into(), value: "ada".into() };
        assert!(QueryCompiler::new(&schema).plan(&condition).unwrap_err().is(ErrorKind::UnknownIndex));
    }

    #[test]
    fn test_range_on_string_value_is_encoding_error() {
        let schema = schema();
        let condition = QueryBuilder::new(&schema).range("age").unwrap().lt("old");
        let err = QueryCompiler::new(&schema).plan(&condition).unwrap_err();
        assert!(err.is(ErrorKind::Encoding));
    }
}
