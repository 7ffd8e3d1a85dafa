#![allow(dead_code)]

use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use cipherdex::crypto::{CipherFactory, TermCipher};
use cipherdex::index::IndexVector;
use cipherdex::query::constraint::ConstraintBody;
use cipherdex::query::WireConstraint;
use cipherdex::schema::meta::KEY_LEN;
use cipherdex::{IndexId, RecordId, Result};

/// Stand-in for the ORE primitive: a 4-byte key fingerprint followed by the
/// big-endian term. Deterministic, and byte order matches term order for
/// ciphertexts under the same keys.
pub struct FakeOre {
    fingerprint: [u8; 4],
}

impl TermCipher for FakeOre {
    fn encrypt(&self, term: u64) -> Result<Bytes> {
        let mut out = Vec::with_capacity(12);
        out.extend_from_slice(&self.fingerprint);
        out.extend_from_slice(&term.to_be_bytes());
        Ok(Bytes::from(out))
    }
}

#[derive(Default)]
pub struct FakeOreFactory {
    pub inits: AtomicUsize,
}

impl FakeOreFactory {
    pub fn shared() -> Arc<Self> {
        Arc::new(FakeOreFactory::default())
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

impl CipherFactory for FakeOreFactory {
    fn init(&self, prf_key: &[u8; KEY_LEN], prp_key: &[u8; KEY_LEN]) -> Result<Arc<dyn TermCipher>> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        let digest = Sha256::new().chain_update(prf_key).chain_update(prp_key).finalize();
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&digest[..4]);
        Ok(Arc::new(FakeOre { fingerprint }))
    }
}

/// A toy encrypted-index service: stores postings and answers conjunctive
/// constraint lists by comparing ciphertext bytes.
#[derive(Default)]
pub struct FakeIndexService {
    postings: BTreeMap<IndexId, Vec<(Bytes, RecordId)>>,
}

impl FakeIndexService {
    pub fn put(&mut self, vectors: &[IndexVector]) {
        for vector in vectors {
            let entry = self.postings.entry(vector.index_id).or_default();
            entry.extend(vector.terms.iter().map(|p| (p.term.clone(), p.link)));
        }
    }

    pub fn query(&self, constraints: &[WireConstraint]) -> BTreeSet<RecordId> {
        let mut result: Option<BTreeSet<RecordId>> = None;

        for constraint in constraints {
            let matching: BTreeSet<RecordId> = self
                .postings
                .get(&constraint.index_id)
                .into_iter()
                .flatten()
                .filter(|(term, _)| match &constraint.body {
                    ConstraintBody::Exact { exact } => *term == exact.term,
                    ConstraintBody::Range { range } => range.lower <= *term && *term <= range.upper,
                })
                .map(|(_, link)| *link)
                .collect();

            result = Some(match result {
                None => matching,
                Some(acc) => acc.intersection(&matching).copied().collect(),
            });
        }

        result.unwrap_or_default()
    }
}
