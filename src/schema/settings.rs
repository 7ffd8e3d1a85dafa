use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use tracing::debug;
use crate::core::error::{Error, Result};
use crate::schema::mapping::Mapping;
use crate::schema::meta::IndexMeta;
use crate::schema::schema::CollectionSchema;

/// What the remote service keeps for one index: the mapping plus its
/// identity and keys. Always sealed before it leaves the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIndexSettings {
    pub mapping: Mapping,
    pub meta: IndexMeta,
}

impl StoredIndexSettings {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Envelope encryption of settings blobs. Provided by the caller.
pub trait SettingsCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>>;
}

impl CollectionSchema {
    pub fn stored_settings(&self) -> Vec<StoredIndexSettings> {
        self.indexes()
            .map(|(_, mapping, meta)| StoredIndexSettings {
                mapping: mapping.clone(),
                meta: meta.clone(),
            })
            .collect()
    }

    /// Rebuilds a schema from stored settings without generating new keys.
    pub fn from_stored(name: &str, settings: Vec<StoredIndexSettings>) -> Result<Self> {
        let mut mappings = BTreeMap::new();
        let mut meta = BTreeMap::new();

        for stored in settings {
            let index_name = stored.meta.index_name.clone();
            if mappings.insert(index_name.clone(), stored.mapping).is_some() {
                return Err(Error::schema(format!(
                    "stored settings name index '{}' twice",
                    index_name
                )));
            }
            meta.insert(index_name, stored.meta);
        }

        CollectionSchema::from_parts(name, mappings, meta)
    }
}

/// One sealed blob per index, in index-name order.
pub fn seal_settings(schema: &CollectionSchema, cipher: &dyn SettingsCipher) -> Result<Vec<Vec<u8>>> {
    schema
        .stored_settings()
        .iter()
        .map(|settings| cipher.seal(&settings.to_bytes()?))
        .collect()
}

pub fn open_settings(
    name: &str,
    sealed: &[Vec<u8>],
    cipher: &dyn SettingsCipher,
) -> Result<CollectionSchema> {
    let settings = sealed
        .iter()
        .map(|blob| StoredIndexSettings::from_bytes(&cipher.open(blob)?))
        .collect::<Result<Vec<_>>>()?;

    debug!(collection = name, indexes = settings.len(), "loaded stored index settings");
    CollectionSchema::from_stored(name, settings)
}
