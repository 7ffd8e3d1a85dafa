use parking_lot::Mutex;
use serde::{Serialize, Deserialize};
use std::sync::Arc;
use tracing::debug;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::{Record, RecordId};
use crate::crypto::cipher::CipherFactory;
use crate::crypto::materials::CipherCache;
use crate::index::analyzer::{AnalyzedRecord, RecordAnalyzer};
use crate::index::posting::{build_vectors, IndexVector};
use crate::parallel::runner::{AnalysisRunner, AnalysisStream};
use crate::query::ast::Condition;
use crate::query::builder::QueryBuilder;
use crate::query::compiler::QueryCompiler;
use crate::query::request::{QueryOptions, QueryRequest};
use crate::schema::schema::CollectionSchema;

/// Postings of one record for every index it participates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRequest {
    pub record_id: RecordId,
    pub vectors: Vec<IndexVector>,
}

/// A schema bound to its prepared analyzer, compiler and ciphers.
pub struct Collection {
    schema: Arc<CollectionSchema>,
    analyzer: RecordAnalyzer,
    compiler: QueryCompiler,
    ciphers: Mutex<CipherCache>,
    factory: Arc<dyn CipherFactory>,
    config: Config,
}

impl Collection {
    pub fn new(schema: CollectionSchema, factory: Arc<dyn CipherFactory>, config: Config) -> Result<Self> {
        config.validate()?;
        let ciphers = CipherCache::new(factory.clone(), config.cipher_cache_capacity)?;

        Ok(Collection {
            analyzer: RecordAnalyzer::new(&schema),
            compiler: QueryCompiler::new(&schema),
            schema: Arc::new(schema),
            ciphers: Mutex::new(ciphers),
            factory,
            config,
        })
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &Arc<CollectionSchema> {
        &self.schema
    }

    pub fn analyze(&self, record: &Record) -> Result<AnalyzedRecord> {
        self.analyzer.analyze(record)
    }

    pub fn prepare_put(&self, record: &Record) -> Result<PutRequest> {
        let analyzed = self.analyzer.analyze(record)?;
        let vectors = build_vectors(&analyzed, &self.schema, &mut self.ciphers.lock())?;

        debug!(collection = self.name(), record = %record.id, vectors = vectors.len(), "prepared put");
        Ok(PutRequest {
            record_id: analyzed.record_id,
            vectors,
        })
    }

    /// As [`prepare_put`](Self::prepare_put) for a JSON document. A document
    /// without an id is given one; the record is returned alongside.
    pub fn prepare_put_json(&self, document: serde_json::Value) -> Result<(Record, PutRequest)> {
        let record = Record::from_json(document)?;
        let put = self.prepare_put(&record)?;
        Ok((record, put))
    }

    pub fn query_builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.schema)
    }

    pub fn build_query<F>(&self, build: F) -> Result<Condition>
    where
        F: FnOnce(&QueryBuilder<'_>) -> Result<Condition>,
    {
        build(&self.query_builder())
    }

    pub fn prepare_query(&self, condition: &Condition, options: &QueryOptions) -> Result<QueryRequest> {
        let constraints = self.compiler.compile(condition, &mut self.ciphers.lock())?;
        QueryRequest::build(&self.schema, options, constraints, self.config.default_query_limit)
    }

    /// A query with no constraints: ordering, paging and aggregates only.
    pub fn prepare_query_all(&self, options: &QueryOptions) -> Result<QueryRequest> {
        QueryRequest::build(&self.schema, options, Vec::new(), self.config.default_query_limit)
    }

    /// Bulk analysis over the configured worker pool.
    pub fn analyze_many<I>(&self, records: I) -> Result<AnalysisStream>
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send + 'static,
    {
        AnalysisRunner::new(self.config.clone(), self.factory.clone())?.analyze(self.schema.clone(), records)
    }
}
