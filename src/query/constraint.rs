use bytes::Bytes;
use serde::{Serialize, Deserialize};
use crate::core::error::Result;
use crate::core::types::IndexId;
use crate::crypto::cipher::TermCipher;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactTerm<T> {
    pub term: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTerms<T> {
    pub lower: T,
    pub upper: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "lowercase")]
pub enum ConstraintBody<T> {
    Exact { exact: ExactTerm<T> },
    Range { range: RangeTerms<T> },
}

/// One server-evaluable condition on one index. On the wire:
/// `{"indexId": .., "condition": "exact", "exact": {"term": ..}}` or
/// `{"indexId": .., "condition": "range", "range": {"lower": .., "upper": ..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint<T> {
    pub index_id: IndexId,
    #[serde(flatten)]
    pub body: ConstraintBody<T>,
}

/// Plaintext terms, before encryption.
pub type TermConstraint = Constraint<u64>;

/// Ciphertext terms, as sent to the service.
pub type WireConstraint = Constraint<Bytes>;

impl<T> Constraint<T> {
    pub fn exact(index_id: IndexId, term: T) -> Self {
        Constraint {
            index_id,
            body: ConstraintBody::Exact { exact: ExactTerm { term } },
        }
    }

    pub fn range(index_id: IndexId, lower: T, upper: T) -> Self {
        Constraint {
            index_id,
            body: ConstraintBody::Range { range: RangeTerms { lower, upper } },
        }
    }
}

impl TermConstraint {
    /// Each term or bound is encrypted on its own.
    pub fn encrypt(&self, cipher: &dyn TermCipher) -> Result<WireConstraint> {
        Ok(match &self.body {
            ConstraintBody::Exact { exact } => Constraint::exact(self.index_id, cipher.encrypt(exact.term)?),
            ConstraintBody::Range { range } => Constraint::range(
                self.index_id,
                cipher.encrypt(range.lower)?,
                cipher.encrypt(range.upper)?,
            ),
        })
    }
}
