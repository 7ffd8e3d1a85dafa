use std::collections::BTreeMap;
use tracing::debug;
use crate::analysis::config::MatchOptions;
use crate::core::error::{Error, Result};
use crate::core::types::IndexId;
use crate::schema::definition::FieldType;
use crate::schema::mapping::Mapping;
use crate::schema::meta::IndexMeta;

/// A named collection of indexes. Immutable once built: there is no way to
/// add or remove a mapping from a live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    name: String,
    mappings: BTreeMap<String, Mapping>,
    meta: BTreeMap<String, IndexMeta>,
}

impl CollectionSchema {
    pub fn define(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            mappings: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Builds a schema from mappings, generating fresh identity and keys for
    /// every index.
    pub fn new(name: &str, mappings: BTreeMap<String, Mapping>) -> Result<Self> {
        let meta = mappings
            .keys()
            .map(|index_name| (index_name.clone(), IndexMeta::generate(index_name)))
            .collect();

        let schema = CollectionSchema::from_parts(name, mappings, meta)?;
        debug!(collection = %schema.name, indexes = schema.mappings.len(), "defined collection schema");
        Ok(schema)
    }

    /// Reassembles a schema from previously generated parts. Key material is
    /// taken as given.
    pub fn from_parts(
        name: &str,
        mappings: BTreeMap<String, Mapping>,
        meta: BTreeMap<String, IndexMeta>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::schema("collection name must not be empty"));
        }

        for (index_name, mapping) in &mappings {
            if index_name.is_empty() {
                return Err(Error::schema(format!("collection '{}' has an unnamed index", name)));
            }
            mapping.validate(index_name)?;

            match meta.get(index_name) {
                Some(m) if m.index_name == *index_name => {}
                Some(m) => {
                    return Err(Error::schema(format!(
                        "meta for index '{}' is labelled '{}'",
                        index_name, m.index_name
                    )));
                }
                None => {
                    return Err(Error::schema(format!(
                        "index '{}' of collection '{}' has no key material",
                        index_name, name
                    )));
                }
            }
        }

        if let Some(orphan) = meta.keys().find(|k| !mappings.contains_key(*k)) {
            return Err(Error::schema(format!(
                "key material for '{}' has no matching mapping",
                orphan
            )));
        }

        Ok(CollectionSchema {
            name: name.to_string(),
            mappings,
            meta,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mappings(&self) -> &BTreeMap<String, Mapping> {
        &self.mappings
    }

    pub fn meta(&self) -> &BTreeMap<String, IndexMeta> {
        &self.meta
    }

    pub fn mapping(&self, index_name: &str) -> Option<&Mapping> {
        self.mappings.get(index_name)
    }

    /// Mapping and meta of an index, or an error naming the collection.
    pub fn index(&self, index_name: &str) -> Result<(&Mapping, &IndexMeta)> {
        match (self.mappings.get(index_name), self.meta.get(index_name)) {
            (Some(mapping), Some(meta)) => Ok((mapping, meta)),
            _ => Err(Error::unknown_index(&self.name, index_name)),
        }
    }

    pub fn index_id(&self, index_name: &str) -> Result<IndexId> {
        self.index(index_name).map(|(_, meta)| meta.index_id)
    }

    /// Every index in name order, with its mapping and meta.
    pub fn indexes(&self) -> impl Iterator<Item = (&str, &Mapping, &IndexMeta)> {
        self.mappings
            .iter()
            .filter_map(|(name, mapping)| self.meta.get(name).map(|meta| (name.as_str(), mapping, meta)))
    }

    pub fn meta_by_id(&self, index_id: IndexId) -> Option<&IndexMeta> {
        self.meta.values().find(|meta| meta.index_id == index_id)
    }

    pub fn index_count(&self) -> usize {
        self.mappings.len()
    }
}

/// Collects mappings for [`CollectionSchema::define`].
pub struct SchemaBuilder {
    name: String,
    mappings: BTreeMap<String, Mapping>,
    duplicates: Vec<String>,
}

impl SchemaBuilder {
    pub fn index(mut self, index_name: &str, mapping: Mapping) -> Self {
        if self.mappings.insert(index_name.to_string(), mapping).is_some() {
            self.duplicates.push(index_name.to_string());
        }
        self
    }

    pub fn exact(self, index_name: &str, field: &str, field_type: FieldType) -> Self {
        self.index(index_name, Mapping::exact(field, field_type))
    }

    pub fn range(self, index_name: &str, field: &str, field_type: FieldType) -> Self {
        self.index(index_name, Mapping::range(field, field_type))
    }

    pub fn match_fields(self, index_name: &str, fields: &[&str], options: MatchOptions) -> Self {
        self.index(index_name, Mapping::match_fields(fields, options))
    }

    pub fn dynamic_match(self, index_name: &str, options: MatchOptions) -> Self {
        self.index(index_name, Mapping::DynamicMatch { options })
    }

    pub fn field_dynamic_match(self, index_name: &str, options: MatchOptions) -> Self {
        self.index(index_name, Mapping::FieldDynamicMatch { options })
    }

    pub fn build(self) -> Result<CollectionSchema> {
        if let Some(duplicate) = self.duplicates.first() {
            return Err(Error::schema(format!(
                "index '{}' is defined more than once in collection '{}'",
                duplicate, self.name
            )));
        }
        CollectionSchema::new(&self.name, self.mappings)
    }
}
