use crossbeam::channel::{Receiver, Sender};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, RecordId};
use crate::crypto::cipher::CipherFactory;
use crate::crypto::materials::CipherCache;
use crate::index::analyzer::RecordAnalyzer;
use crate::index::posting::{build_vectors, IndexVector};
use crate::schema::schema::CollectionSchema;

pub type WorkerId = usize;

/// One record to analyze against one schema.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub job_id: u64,
    pub schema: Arc<CollectionSchema>,
    pub record: Record,
}

/// Encrypted postings of one record, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub job_id: u64,
    pub record_id: RecordId,
    pub vectors: Vec<IndexVector>,
}

#[derive(Debug, Clone)]
pub struct JobFailure {
    pub job_id: u64,
    pub record_id: RecordId,
    pub worker_id: WorkerId,
    pub error: Error,
}

pub(crate) struct WorkerReport {
    pub worker_id: WorkerId,
    pub outcome: std::result::Result<AnalysisResult, JobFailure>,
}

/// Per-worker state. Never shared between threads.
struct WorkerState {
    id: WorkerId,
    analyzers: LruCache<String, Arc<RecordAnalyzer>>,
    ciphers: CipherCache,
}

impl WorkerState {
    fn analyzer_for(&mut self, schema: &CollectionSchema) -> Arc<RecordAnalyzer> {
        if let Some(analyzer) = self.analyzers.get(schema.name()) {
            return analyzer.clone();
        }

        debug!(worker = self.id, collection = schema.name(), "building record analyzer");
        let analyzer = Arc::new(RecordAnalyzer::new(schema));
        self.analyzers.put(schema.name().to_string(), analyzer.clone());
        analyzer
    }

    fn perform(&mut self, job: &AnalysisJob) -> Result<AnalysisResult> {
        let analyzer = self.analyzer_for(&job.schema);
        let analyzed = analyzer.analyze(&job.record)?;
        let vectors = build_vectors(&analyzed, &job.schema, &mut self.ciphers)?;

        Ok(AnalysisResult {
            job_id: job.job_id,
            record_id: analyzed.record_id,
            vectors,
        })
    }

    /// A panic inside analysis fails the job, not the worker.
    fn perform_isolated(&mut self, job: &AnalysisJob) -> std::result::Result<AnalysisResult, JobFailure> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.perform(job)))
            .unwrap_or_else(|payload| {
                Err(Error::new(
                    ErrorKind::Analysis,
                    format!("analysis panicked: {}", panic_message(payload.as_ref())),
                ))
            });

        outcome.map_err(|error| {
            warn!(worker = self.id, job = job.job_id, record = %job.record.id, error = %error, "analysis job failed");
            JobFailure {
                job_id: job.job_id,
                record_id: job.record.id,
                worker_id: self.id,
                error,
            }
        })
    }
}

/// Handle to a worker thread. Dropping the job sender stops the thread once
/// its queue is empty.
pub(crate) struct Worker {
    pub id: WorkerId,
    jobs: Option<Sender<AnalysisJob>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(
        id: WorkerId,
        factory: Arc<dyn CipherFactory>,
        analyzer_cache_capacity: usize,
        cipher_cache_capacity: usize,
        reports: Sender<WorkerReport>,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(analyzer_cache_capacity).ok_or_else(|| {
            Error::new(ErrorKind::InvalidArgument, "analyzer cache capacity must be at least 1")
        })?;
        let state = WorkerState {
            id,
            analyzers: LruCache::new(capacity),
            ciphers: CipherCache::new(factory, cipher_cache_capacity)?,
        };

        let (job_sender, job_receiver) = crossbeam::channel::unbounded();
        let handle = thread::Builder::new()
            .name(format!("cipherdex-worker-{}", id))
            .spawn(move || Self::run(state, job_receiver, reports))
            .map_err(|e| Error::new(ErrorKind::InvalidState, format!("failed to spawn worker {}: {}", id, e)))?;

        Ok(Worker {
            id,
            jobs: Some(job_sender),
            handle: Some(handle),
        })
    }

    fn run(mut state: WorkerState, jobs: Receiver<AnalysisJob>, reports: Sender<WorkerReport>) {
        debug!(worker = state.id, "worker started");

        while let Ok(job) = jobs.recv() {
            let outcome = state.perform_isolated(&job);
            let report = WorkerReport {
                worker_id: state.id,
                outcome,
            };
            if reports.send(report).is_err() {
                break;
            }
        }

        debug!(worker = state.id, ciphers = state.ciphers.len(), "worker stopped");
    }

    /// Hands the job back if the worker is gone.
    pub fn submit(&self, job: AnalysisJob) -> std::result::Result<(), AnalysisJob> {
        match &self.jobs {
            Some(sender) => sender.send(job).map_err(|e| e.into_inner()),
            None => Err(job),
        }
    }

    /// Closes the job channel and waits for the thread to exit.
    pub fn terminate(&mut self) -> bool {
        self.jobs.take();
        match self.handle.take() {
            Some(handle) => handle.join().is_ok(),
            None => false,
        }
    }
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use crate::analysis::config::MatchOptions;
    use crate::crypto::cipher::TermCipher;
    use crate::schema::definition::FieldType;
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

    fn state() -> WorkerState {
        WorkerState {
            id: 0,
            analyzers: LruCache::new(NonZeroUsize::new(2).unwrap()),
            ciphers: CipherCache::new(Arc::new(PlainFactory), 8).unwrap(),
        }
    }

    fn schema(name: &str) -> Arc<CollectionSchema> {
        Arc::new(
            CollectionSchema::define(name)
                .range("age", "age", FieldType::Number)
                .dynamic_match("all", MatchOptions::standard_downcase())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_analyzer_cached_by_schema_name() {
        let mut state = state();
        let users = schema("users");
        let a = state.analyzer_for(&users);
        let b = state.analyzer_for(&users);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(state.analyzers.len(), 1);
    }

    #[test]
    fn test_failed_job_reports_record() {
        let mut state = state();
        let record = Record::new(RecordId::generate()).with_field("age", "old");
        let job = AnalysisJob { job_id: 7, schema: schema("users"), record: record.clone() };

        let failure = state.perform_isolated(&job).unwrap_err();
        assert_eq!(failure.job_id, 7);
        assert_eq!(failure.record_id, record.id);
        assert!(failure.error.is(ErrorKind::Encoding));
    }

    #[test]
    fn test_worker_thread_round_trip() {
        let (report_sender, report_receiver) = crossbeam::channel::unbounded();
        let mut worker = Worker::spawn(3, Arc::new(PlainFactory), 4, 8, report_sender).unwrap();

        let record = Record::new(RecordId::generate()).with_field("age", 42.0);
        worker
            .submit(AnalysisJob { job_id: 1, schema: schema("users"), record: record.clone() })
            .unwrap();

        let report = report_receiver.recv().unwrap();
        assert_eq!(report.worker_id, 3);
        let result = report.outcome.unwrap();
        assert_eq!(result.record_id, record.id);
        assert_eq!(result.vectors.len(), 1);

        assert!(worker.terminate());
    }
}
