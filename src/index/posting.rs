use bytes::Bytes;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};
use crate::core::types::{IndexId, RecordId};
use crate::crypto::materials::CipherCache;
use crate::index::analyzer::AnalyzedRecord;
use crate::schema::schema::CollectionSchema;

/// One encrypted term linked back to the record it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub term: Bytes,
    pub link: RecordId,
}

/// Postings of one record for one index, as sent on put.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexVector {
    pub index_id: IndexId,
    pub terms: Vec<Posting>, // One per analyzed term, duplicates kept
}

impl IndexVector {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Encrypts every term of an analyzed record under its index's keys.
pub fn build_vectors(
    analyzed: &AnalyzedRecord,
    schema: &CollectionSchema,
    ciphers: &mut CipherCache,
) -> Result<Vec<IndexVector>> {
    analyzed
        .index_entries
        .iter()
        .map(|(index_id, terms)| {
            let meta = schema.meta_by_id(*index_id).ok_or_else(|| {
                Error::schema(format!(
                    "collection '{}' has no index with id {}",
                    schema.name(),
                    index_id
                ))
            })?;
            let cipher = ciphers.cipher_for(meta)?;

            let terms = terms
                .iter()
                .map(|term| {
                    Ok(Posting {
                        term: cipher.encrypt(*term)?,
                        link: analyzed.record_id,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(IndexVector {
                index_id: *index_id,
                terms,
            })
        })
        .collect()
}
