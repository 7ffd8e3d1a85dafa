use std::cmp::Ordering;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use crate::core::error::{Error, Result};
use crate::core::types::FieldValue;
use crate::encoding::date::{epoch_millis_with_resolution, DateResolution};
use crate::encoding::hash::hash_term;
use crate::encoding::number::{f64_to_ordered, ordered_to_f64};

/// Type witness carried alongside an encoded term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Number,
    BigInt,
    Boolean,
    Date,
    String,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Number => "number",
            SourceType::BigInt => "bigint",
            SourceType::Boolean => "boolean",
            SourceType::Date => "date",
            SourceType::String => "string",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A u64 whose ordering matches the ordering of its source value, as long as
/// it is only compared with terms of the same source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderableTerm {
    pub source_type: SourceType,
    pub orderable: u64,
}

impl PartialOrd for OrderableTerm {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.source_type == other.source_type {
            Some(self.orderable.cmp(&other.orderable))
        } else {
            None
        }
    }
}

/// A u64 that is equal for equal source values of the same type. Carries no
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EquatableTerm {
    pub source_type: SourceType,
    pub equatable: u64,
}

pub fn encode_orderable(value: &FieldValue) -> Result<OrderableTerm> {
    encode_orderable_with_resolution(value, DateResolution::Millisecond)
}

pub fn encode_orderable_with_resolution(
    value: &FieldValue,
    resolution: DateResolution,
) -> Result<OrderableTerm> {
    match value {
        FieldValue::Number(n) => Ok(OrderableTerm {
            source_type: SourceType::Number,
            orderable: encode_number(*n)?,
        }),
        FieldValue::Integer(i) => Ok(OrderableTerm {
            source_type: SourceType::BigInt,
            orderable: integer_in_domain(*i)?,
        }),
        FieldValue::Boolean(b) => Ok(OrderableTerm {
            source_type: SourceType::Boolean,
            orderable: *b as u64,
        }),
        FieldValue::Date(date) => Ok(OrderableTerm {
            source_type: SourceType::Date,
            orderable: encode_date(date, resolution),
        }),
        other => Err(Error::encoding(format!(
            "values of type {} cannot be order-encoded",
            other.type_name()
        ))),
    }
}

pub fn encode_equatable(value: &FieldValue) -> Result<EquatableTerm> {
    encode_equatable_with_resolution(value, DateResolution::Millisecond)
}

pub fn encode_equatable_with_resolution(
    value: &FieldValue,
    resolution: DateResolution,
) -> Result<EquatableTerm> {
    match value {
        FieldValue::Text(text) => Ok(encode_equatable_str(text)),
        FieldValue::Number(n) => {
            // Reject NaN here too, it never equals itself
            encode_number(*n)?;
            let canonical = if *n == 0.0 { 0.0 } else { *n };
            Ok(EquatableTerm {
                source_type: SourceType::Number,
                equatable: hash_term(&canonical.to_string()),
            })
        }
        FieldValue::Integer(i) => Ok(EquatableTerm {
            source_type: SourceType::BigInt,
            equatable: hash_term(&i.to_string()),
        }),
        FieldValue::Boolean(b) => Ok(EquatableTerm {
            source_type: SourceType::Boolean,
            equatable: *b as u64,
        }),
        FieldValue::Date(date) => Ok(EquatableTerm {
            source_type: SourceType::Date,
            equatable: hash_term(&epoch_millis_with_resolution(date, resolution).to_string()),
        }),
        other => Err(Error::encoding(format!(
            "values of type {} cannot be equality-encoded",
            other.type_name()
        ))),
    }
}

/// Equality encoding of a string, the path every token of a match index takes.
pub fn encode_equatable_str(text: &str) -> EquatableTerm {
    EquatableTerm {
        source_type: SourceType::String,
        equatable: hash_term(text),
    }
}

/// Inverse of [`encode_orderable`], using the carried type witness.
pub fn decode_orderable(term: &OrderableTerm) -> FieldValue {
    match term.source_type {
        SourceType::Number => FieldValue::Number(ordered_to_f64(term.orderable)),
        SourceType::BigInt => FieldValue::Integer(term.orderable as i128),
        SourceType::Boolean => FieldValue::Boolean(term.orderable != 0),
        SourceType::Date => {
            let millis = ordered_to_f64(term.orderable) as i64;
            DateTime::<Utc>::from_timestamp_millis(millis)
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Null)
        }
        SourceType::String => unreachable!("strings are never order-encoded"),
    }
}

fn encode_number(n: f64) -> Result<u64> {
    if n.is_nan() {
        return Err(Error::encoding("NaN has no position in the order"));
    }
    Ok(f64_to_ordered(n))
}

fn encode_date(date: &DateTime<Utc>, resolution: DateResolution) -> u64 {
    f64_to_ordered(epoch_millis_with_resolution(date, resolution) as f64)
}

fn integer_in_domain(value: i128) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        Error::encoding(format!(
            "integer {} is outside the encodable range [0, {}]",
            value,
            u64::MAX
        ))
    })
}
