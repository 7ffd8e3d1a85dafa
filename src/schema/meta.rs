use serde::{Serialize, Deserialize};
use std::fmt;
use rand::RngCore;
use crate::core::types::IndexId;

pub const KEY_LEN: usize = 16;

/// Identity and key material of one index. Generated exactly once, when the
/// index is first defined; regenerating it orphans every posting written
/// under the old keys.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMeta {
    pub index_name: String,
    pub index_id: IndexId,
    #[serde(with = "hex_key")]
    pub prf_key: [u8; KEY_LEN],
    #[serde(with = "hex_key")]
    pub prp_key: [u8; KEY_LEN],
}

impl IndexMeta {
    pub fn generate(index_name: &str) -> Self {
        let mut rng = rand::thread_rng();
        let mut prf_key = [0u8; KEY_LEN];
        let mut prp_key = [0u8; KEY_LEN];
        rng.fill_bytes(&mut prf_key);
        rng.fill_bytes(&mut prp_key);

        IndexMeta {
            index_name: index_name.to_string(),
            index_id: IndexId::generate(),
            prf_key,
            prp_key,
        }
    }
}

// Keys stay out of logs
impl fmt::Debug for IndexMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMeta")
            .field("index_name", &self.index_name)
            .field("index_id", &self.index_id)
            .field("prf_key", &"<redacted>")
            .field("prp_key", &"<redacted>")
            .finish()
    }
}

mod hex_key {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde::de::Error as _;
    use super::KEY_LEN;

    pub fn serialize<S: Serializer>(key: &[u8; KEY_LEN], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; KEY_LEN], D::Error> {
        let raw = String::deserialize(deserializer)?;
        let bytes = hex::decode(&raw).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| D::Error::custom(format!("expected {} key bytes, found {}", KEY_LEN, b.len())))
    }
}
