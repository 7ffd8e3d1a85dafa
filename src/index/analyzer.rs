use std::collections::BTreeMap;
use tracing::trace;
use crate::analysis::pipeline::TextPipeline;
use crate::core::error::{Error, Result};
use crate::core::types::{FieldValue, IndexId, Record, RecordId};
use crate::encoding::term::{encode_equatable, encode_equatable_str, encode_orderable, SourceType};
use crate::index::extract::{string_fields, string_fields_with_path};
use crate::index::field_path::FieldPath;
use crate::schema::definition::FieldType;
use crate::schema::mapping::Mapping;
use crate::schema::schema::CollectionSchema;

/// Plaintext terms of one record, per index. Indexes that produced no terms
/// are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedRecord {
    pub record_id: RecordId,
    pub index_entries: BTreeMap<IndexId, Vec<u64>>,
}

impl AnalyzedRecord {
    pub fn term_count(&self) -> usize {
        self.index_entries.values().map(Vec::len).sum()
    }
}

enum Extractor {
    Exact(FieldPath, Option<FieldType>),
    Range(FieldPath, Option<FieldType>),
    Match {
        paths: Vec<FieldPath>,
        pipeline: TextPipeline,
    },
    DynamicMatch(TextPipeline),
    FieldDynamicMatch(TextPipeline),
}

struct IndexAnalyzer {
    index_name: String,
    index_id: IndexId,
    extractor: Extractor,
}

/// Turns records into per-index terms. Field paths and text pipelines are
/// prepared once, when the analyzer is built, and reused for every record.
pub struct RecordAnalyzer {
    collection: String,
    indexes: Vec<IndexAnalyzer>,
}

impl RecordAnalyzer {
    pub fn new(schema: &CollectionSchema) -> Self {
        let indexes = schema
            .indexes()
            .map(|(index_name, mapping, meta)| IndexAnalyzer {
                index_name: index_name.to_string(),
                index_id: meta.index_id,
                extractor: build_extractor(mapping),
            })
            .collect();

        RecordAnalyzer {
            collection: schema.name().to_string(),
            indexes,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Fails on the first value that cannot be encoded for its index.
    /// Missing fields are not errors; they just contribute no terms.
    pub fn analyze(&self, record: &Record) -> Result<AnalyzedRecord> {
        let mut index_entries = BTreeMap::new();

        for index in &self.indexes {
            let terms = index.terms(&record.fields).map_err(|e| {
                Error::new(
                    e.kind,
                    format!("index '{}' of collection '{}': {}", index.index_name, self.collection, e.context),
                )
            })?;

            if !terms.is_empty() {
                index_entries.insert(index.index_id, terms);
            }
        }

        trace!(collection = %self.collection, record = %record.id, indexes = index_entries.len(), "analyzed record");
        Ok(AnalyzedRecord {
            record_id: record.id,
            index_entries,
        })
    }
}

impl IndexAnalyzer {
    fn terms(&self, fields: &BTreeMap<String, FieldValue>) -> Result<Vec<u64>> {
        match &self.extractor {
            Extractor::Exact(path, declared) => match path.resolve(fields) {
                Some(value) => {
                    let term = encode_equatable(value)?;
                    check_declared(path, *declared, term.source_type)?;
                    Ok(vec![term.equatable])
                }
                None => Ok(Vec::new()),
            },
            Extractor::Range(path, declared) => match path.resolve(fields) {
                Some(value) => {
                    let term = encode_orderable(value)?;
                    check_declared(path, *declared, term.source_type)?;
                    Ok(vec![term.orderable])
                }
                None => Ok(Vec::new()),
            },
            Extractor::Match { paths, pipeline } => {
                let mut texts = Vec::with_capacity(paths.len());
                for path in paths {
                    match path.resolve(fields) {
                        Some(FieldValue::Text(text)) => texts.push(text.clone()),
                        Some(other) => {
                            return Err(Error::encoding(format!(
                                "match field '{}' must be a string, found {}",
                                path.as_str(),
                                other.type_name()
                            )));
                        }
                        None => {}
                    }
                }
                Ok(encode_tokens(pipeline.run(texts)))
            }
            Extractor::DynamicMatch(pipeline) => Ok(encode_tokens(pipeline.run(string_fields(fields)))),
            Extractor::FieldDynamicMatch(pipeline) => {
                let scoped = string_fields_with_path(fields)
                    .into_iter()
                    .flat_map(|(path, text)| {
                        pipeline
                            .analyze(&text)
                            .into_iter()
                            .map(move |token| scoped_token(&path, &token))
                    })
                    .collect();
                Ok(encode_tokens(scoped))
            }
        }
    }
}

fn check_declared(path: &FieldPath, declared: Option<FieldType>, found: SourceType) -> Result<()> {
    match declared {
        Some(declared) if declared.source_type() != found => Err(Error::encoding(format!(
            "field '{}' holds a {} value but the index is declared over {}",
            path.as_str(),
            found,
            declared
        ))),
        _ => Ok(()),
    }
}

/// Token of a field-dynamic-match index: `<dotted path>:<token>`.
pub fn scoped_token(path: &str, token: &str) -> String {
    format!("{}:{}", path, token)
}

fn encode_tokens(tokens: Vec<String>) -> Vec<u64> {
    tokens
        .iter()
        .map(|token| encode_equatable_str(token).equatable)
        .collect()
}

fn build_extractor(mapping: &Mapping) -> Extractor {
    match mapping {
        Mapping::Exact { field, field_type } => Extractor::Exact(FieldPath::parse(field), *field_type),
        Mapping::Range { field, field_type } => Extractor::Range(FieldPath::parse(field), *field_type),
        Mapping::Match { fields, options } => Extractor::Match {
            paths: fields.iter().map(|f| FieldPath::parse(f)).collect(),
            pipeline: TextPipeline::from_options(options),
        },
        Mapping::DynamicMatch { options } => Extractor::DynamicMatch(TextPipeline::from_options(options)),
        Mapping::FieldDynamicMatch { options } => {
            Extractor::FieldDynamicMatch(TextPipeline::from_options(options))
        }
    }
}
