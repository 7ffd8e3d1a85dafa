use bytes::Bytes;
use std::sync::Arc;
use crate::core::error::Result;
use crate::schema::meta::KEY_LEN;

/// The order-revealing encryption primitive, keyed for one index.
///
/// Must be deterministic: the same term under the same keys always yields
/// the same ciphertext, and ciphertext comparison reflects term comparison.
pub trait TermCipher: Send + Sync {
    fn encrypt(&self, term: u64) -> Result<Bytes>;
}

/// Builds a [`TermCipher`] from an index's key pair. Initialisation may be
/// expensive; callers cache the result per index.
pub trait CipherFactory: Send + Sync {
    fn init(&self, prf_key: &[u8; KEY_LEN], prp_key: &[u8; KEY_LEN]) -> Result<Arc<dyn TermCipher>>;
}
