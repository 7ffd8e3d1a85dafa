use serde::{Serialize, Deserialize};
use std::fmt;
use crate::analysis::config::MatchOptions;
use crate::core::error::{Error, Result};
use crate::schema::definition::{compatible_types, FieldType};

/// How one named index projects the fields of a record.
///
/// Match-style variants carry their text processing options inline, so the
/// serialised form is flat: `{"kind": "match", "fields": [..], "tokenizer": {..},
/// "tokenFilters": [..]}`.
///
/// Exact and range mappings declare the type of their field. Values of any
/// other type are rejected on both the write and the query side, since terms
/// of different source types are not comparable. A collection definition may
/// leave `fieldType` out and have it filled from the declared record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Mapping {
    /// Equality on a single field.
    Exact {
        field: String,
        #[serde(rename = "fieldType", default, skip_serializing_if = "Option::is_none")]
        field_type: Option<FieldType>,
    },
    /// Equality and ordering on a single field.
    Range {
        field: String,
        #[serde(rename = "fieldType", default, skip_serializing_if = "Option::is_none")]
        field_type: Option<FieldType>,
    },
    /// Full-text equality over the tokens of the named string fields.
    Match {
        fields: Vec<String>,
        #[serde(flatten)]
        options: MatchOptions,
    },
    /// Full-text equality over every string anywhere in the record.
    DynamicMatch {
        #[serde(flatten)]
        options: MatchOptions,
    },
    /// Like `DynamicMatch`, with each token namespaced by its field path.
    FieldDynamicMatch {
        #[serde(flatten)]
        options: MatchOptions,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Exact,
    Range,
    Match,
    DynamicMatch,
    FieldDynamicMatch,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::Exact => "exact",
            MappingKind::Range => "range",
            MappingKind::Match => "match",
            MappingKind::DynamicMatch => "dynamic-match",
            MappingKind::FieldDynamicMatch => "field-dynamic-match",
        }
    }

    /// Query operators this kind of index answers.
    pub fn operators(&self) -> &'static [&'static str] {
        match self {
            MappingKind::Exact => &["eq"],
            MappingKind::Range => &["lt", "lte", "eq", "gt", "gte", "between"],
            MappingKind::Match | MappingKind::DynamicMatch | MappingKind::FieldDynamicMatch => &["match"],
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Mapping {
    pub fn exact(field: &str, field_type: FieldType) -> Self {
        Mapping::Exact {
            field: field.to_string(),
            field_type: Some(field_type),
        }
    }

    pub fn range(field: &str, field_type: FieldType) -> Self {
        Mapping::Range {
            field: field.to_string(),
            field_type: Some(field_type),
        }
    }

    pub fn match_fields(fields: &[&str], options: MatchOptions) -> Self {
        Mapping::Match {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            options,
        }
    }

    pub fn kind(&self) -> MappingKind {
        match self {
            Mapping::Exact { .. } => MappingKind::Exact,
            Mapping::Range { .. } => MappingKind::Range,
            Mapping::Match { .. } => MappingKind::Match,
            Mapping::DynamicMatch { .. } => MappingKind::DynamicMatch,
            Mapping::FieldDynamicMatch { .. } => MappingKind::FieldDynamicMatch,
        }
    }

    /// Declared field type of an exact or range mapping.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Mapping::Exact { field_type, .. } | Mapping::Range { field_type, .. } => *field_type,
            _ => None,
        }
    }

    /// Sets the field type of an exact or range mapping that has none yet.
    pub fn or_field_type(self, declared: FieldType) -> Self {
        match self {
            Mapping::Exact { field, field_type } => Mapping::Exact {
                field,
                field_type: field_type.or(Some(declared)),
            },
            Mapping::Range { field, field_type } => Mapping::Range {
                field,
                field_type: field_type.or(Some(declared)),
            },
            other => other,
        }
    }

    pub fn options(&self) -> Option<&MatchOptions> {
        match self {
            Mapping::Exact { .. } | Mapping::Range { .. } => None,
            Mapping::Match { options, .. }
            | Mapping::DynamicMatch { options }
            | Mapping::FieldDynamicMatch { options } => Some(options),
        }
    }

    /// Field paths named by the mapping. Dynamic mappings name none.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Mapping::Exact { field, .. } | Mapping::Range { field, .. } => vec![field.as_str()],
            Mapping::Match { fields, .. } => fields.iter().map(String::as_str).collect(),
            Mapping::DynamicMatch { .. } | Mapping::FieldDynamicMatch { .. } => Vec::new(),
        }
    }

    pub fn validate(&self, index_name: &str) -> Result<()> {
        if let Mapping::Match { fields, .. } = self {
            if fields.is_empty() {
                return Err(Error::schema(format!(
                    "match index '{}' must name at least one field",
                    index_name
                )));
            }
        }

        for field in self.fields() {
            if field.is_empty() || field.split('.').any(str::is_empty) {
                return Err(Error::schema(format!(
                    "index '{}' has malformed field path '{}'",
                    index_name, field
                )));
            }
        }

        if let Mapping::Exact { field, field_type } | Mapping::Range { field, field_type } = self {
            let kind = self.kind();
            match field_type {
                None => {
                    return Err(Error::schema(format!(
                        "{} index '{}' must declare the type of field '{}'",
                        kind, index_name, field
                    )));
                }
                Some(t) if !compatible_types(kind).contains(t) => {
                    return Err(Error::schema(format!(
                        "{} index '{}' cannot be built over {} field '{}'",
                        kind, index_name, t, field
                    )));
                }
                Some(_) => {}
            }
        }

        if let Some(options) = self.options() {
            options.validate().map_err(|e| {
                Error::schema(format!("index '{}': {}", index_name, e.context))
            })?;
        }
        Ok(())
    }
}
