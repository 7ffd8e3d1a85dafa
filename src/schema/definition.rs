use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;
use crate::core::error::{Error, Result};
use crate::encoding::term::SourceType;
use crate::schema::mapping::{Mapping, MappingKind};
use crate::schema::schema::CollectionSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    BigInt,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::BigInt => "bigint",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }

    /// The witness every term encoded from a field of this type carries.
    pub fn source_type(&self) -> SourceType {
        match self {
            FieldType::String => SourceType::String,
            FieldType::Number => SourceType::Number,
            FieldType::BigInt => SourceType::BigInt,
            FieldType::Date => SourceType::Date,
            FieldType::Boolean => SourceType::Boolean,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared record type: scalars at the leaves, nested objects inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeNode {
    Scalar(FieldType),
    Object(BTreeMap<String, TypeNode>),
}

const EXACT_TYPES: &[FieldType] = &[
    FieldType::String,
    FieldType::Number,
    FieldType::BigInt,
    FieldType::Date,
    FieldType::Boolean,
];
const RANGE_TYPES: &[FieldType] = &[
    FieldType::Number,
    FieldType::BigInt,
    FieldType::Date,
    FieldType::Boolean,
];
const MATCH_TYPES: &[FieldType] = &[FieldType::String];

/// Field types an index of the given kind can be built over. Dynamic kinds
/// take whatever strings they find and have no declared fields to check.
pub fn compatible_types(kind: MappingKind) -> &'static [FieldType] {
    match kind {
        MappingKind::Exact => EXACT_TYPES,
        MappingKind::Range => RANGE_TYPES,
        MappingKind::Match => MATCH_TYPES,
        MappingKind::DynamicMatch | MappingKind::FieldDynamicMatch => &[],
    }
}

/// A collection definition document:
///
/// ```json
/// { "type": { "title": "string", "meta": { "year": "number" } },
///   "indexes": { "title": { "kind": "match", "fields": ["title"], ... } } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    pub record_type: BTreeMap<String, TypeNode>,
    pub indexes: BTreeMap<String, Mapping>,
}

impl SchemaDefinition {
    /// Parses and type-checks a definition document.
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: SchemaDefinition = serde_json::from_str(json)?;
        definition.typecheck()?;
        Ok(definition)
    }

    /// Every field a mapping names must exist in the record type and be of a
    /// type the mapping kind accepts. All problems are reported together.
    pub fn typecheck(&self) -> Result<()> {
        let problems: Vec<String> = self
            .indexes
            .iter()
            .flat_map(|(index_name, mapping)| {
                let kind = mapping.kind();
                let declared = mapping.field_type();
                mapping
                    .fields()
                    .into_iter()
                    .filter_map(move |field| {
                        check_field(&self.record_type, index_name, kind, declared, field).err()
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::schema(problems.join("; ")))
        }
    }

    /// Exact and range mappings without a `fieldType` take the type their
    /// field has in the record type.
    pub fn into_schema(self, name: &str) -> Result<CollectionSchema> {
        self.typecheck()?;
        let SchemaDefinition { record_type, indexes } = self;

        let mappings = indexes
            .into_iter()
            .map(|(index_name, mapping)| {
                let resolved = match &mapping {
                    Mapping::Exact { field, .. } | Mapping::Range { field, .. } => {
                        match resolve_type(&record_type, field) {
                            Some(TypeNode::Scalar(field_type)) => Some(*field_type),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                let mapping = match resolved {
                    Some(field_type) => mapping.or_field_type(field_type),
                    None => mapping,
                };
                (index_name, mapping)
            })
            .collect();

        CollectionSchema::new(name, mappings)
    }
}

fn check_field(
    record_type: &BTreeMap<String, TypeNode>,
    index_name: &str,
    kind: MappingKind,
    declared: Option<FieldType>,
    path: &str,
) -> std::result::Result<(), String> {
    let found = resolve_type(record_type, path)
        .ok_or_else(|| format!("index '{}': field '{}' not found in type", index_name, path))?;

    let expected = compatible_types(kind);
    match found {
        TypeNode::Scalar(field_type) if expected.contains(field_type) => match declared {
            Some(declared) if declared != *field_type => Err(format!(
                "index '{}': declares field '{}' as {} but it is of type {}",
                index_name, path, declared, field_type
            )),
            _ => Ok(()),
        },
        other => Err(format!(
            "index '{}': {} index works on fields of type {} but field '{}' is of type {}",
            index_name,
            kind,
            expected.iter().map(FieldType::as_str).collect::<Vec<_>>().join(", "),
            path,
            match other {
                TypeNode::Scalar(t) => t.as_str(),
                TypeNode::Object(_) => "object",
            }
        )),
    }
}

fn resolve_type<'a>(record_type: &'a BTreeMap<String, TypeNode>, path: &str) -> Option<&'a TypeNode> {
    let mut parts = path.split('.');
    let mut current = record_type.get(parts.next()?)?;
    for part in parts {
        match current {
            TypeNode::Object(children) => current = children.get(part)?,
            TypeNode::Scalar(_) => return None,
        }
    }
    Some(current)
}
