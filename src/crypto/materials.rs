use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::debug;
use crate::core::error::{Error, Result};
use crate::core::types::IndexId;
use crate::crypto::cipher::{CipherFactory, TermCipher};
use crate::schema::meta::IndexMeta;

/// Lazily initialised ciphers keyed by index id. Each worker owns one, so
/// nothing here is shared or locked.
pub struct CipherCache {
    factory: Arc<dyn CipherFactory>,
    ciphers: LruCache<IndexId, Arc<dyn TermCipher>>,
    pub init_count: usize,
}

impl CipherCache {
    pub fn new(factory: Arc<dyn CipherFactory>, capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Error::crypto("cipher cache capacity must be at least 1"))?;
        Ok(CipherCache {
            factory,
            ciphers: LruCache::new(capacity),
            init_count: 0,
        })
    }

    pub fn cipher_for(&mut self, meta: &IndexMeta) -> Result<Arc<dyn TermCipher>> {
        if let Some(cipher) = self.ciphers.get(&meta.index_id) {
            return Ok(cipher.clone());
        }

        let cipher = self.factory.init(&meta.prf_key, &meta.prp_key)?;
        self.init_count += 1;
        debug!(index = %meta.index_name, index_id = %meta.index_id, "initialised index cipher");

        self.ciphers.put(meta.index_id, cipher.clone());
        Ok(cipher)
    }

    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use crate::schema::meta::KEY_LEN;

    struct PlainCipher;

    impl TermCipher for PlainCipher {
        fn encrypt(&self, term: u64) -> Result<Bytes> {
            Ok(Bytes::copy_from_slice(&term.to_be_bytes()))
        }
    }

    struct PlainFactory;

    impl CipherFactory for PlainFactory {
        fn init(&self, _prf: &[u8; KEY_LEN], _prp: &[u8; KEY_LEN]) -> Result<Arc<dyn TermCipher>> {
            Ok(Arc::new(PlainCipher))
        }
    }

    #[test]
    fn test_cipher_initialised_once_per_index() {
        let mut cache = CipherCache::new(Arc::new(PlainFactory), 4).unwrap();
        let email = IndexMeta::generate("email");
        let age = IndexMeta::generate("age");

        cache.cipher_for(&email).unwrap();
        cache.cipher_for(&email).unwrap();
        cache.cipher_for(&age).unwrap();

        assert_eq!(cache.init_count, 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_eviction_reinitialises() {
        let mut cache = CipherCache::new(Arc::new(PlainFactory), 1).unwrap();
        let email = IndexMeta::generate("email");
        let age = IndexMeta::generate("age");

        cache.cipher_for(&email).unwrap();
        cache.cipher_for(&age).unwrap();
        cache.cipher_for(&email).unwrap();
        assert_eq!(cache.init_count, 3);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(CipherCache::new(Arc::new(PlainFactory), 0).is_err());
    }
}
