use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Record;
use crate::crypto::cipher::CipherFactory;
use crate::parallel::queue::AsyncQueue;
use crate::parallel::worker::{panic_message, AnalysisJob, AnalysisResult, JobFailure, Worker, WorkerReport};
use crate::schema::schema::CollectionSchema;

/// What happened to one job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    Analyzed(AnalysisResult),
    Failed(JobFailure),
}

/// Final counts of a pipeline run, available once the output has ended.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub job_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub failures: Vec<JobFailure>,
    pub workers_terminated: usize,
    /// Set when the record source panicked; no further records were pulled.
    pub source_failure: Option<String>,
}

impl PipelineReport {
    pub fn is_complete(&self) -> bool {
        self.job_count == self.success_count + self.failure_count
    }
}

/// Bulk analysis across a fixed pool of worker threads.
///
/// Records are pulled from the source one at a time. Each worker starts with
/// one job and is handed the next as soon as it reports, so at most one job
/// per worker is in flight. The run is finished when every dispatched job has
/// either succeeded or failed; the workers are then stopped and the output
/// ended.
///
/// There is no cancellation or timeout. A `TermCipher::encrypt` call that
/// never returns holds its worker for the rest of the run.
pub struct AnalysisRunner {
    config: Config,
    factory: Arc<dyn CipherFactory>,
}

impl AnalysisRunner {
    pub fn new(config: Config, factory: Arc<dyn CipherFactory>) -> Result<Self> {
        config.validate()?;
        Ok(AnalysisRunner { config, factory })
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Starts a run over `records` and returns its output stream. Workers
    /// live for this run only.
    pub fn analyze<I>(&self, schema: Arc<CollectionSchema>, records: I) -> Result<AnalysisStream>
    where
        I: IntoIterator<Item = Record>,
        I::IntoIter: Send + 'static,
    {
        let (report_sender, report_receiver) = crossbeam::channel::unbounded();
        let workers = (0..self.config.worker_count)
            .map(|id| {
                Worker::spawn(
                    id,
                    self.factory.clone(),
                    self.config.analyzer_cache_capacity,
                    self.config.cipher_cache_capacity,
                    report_sender.clone(),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        drop(report_sender);

        let queue = Arc::new(AsyncQueue::new());
        let report = Arc::new(Mutex::new(None));
        let collection = schema.name().to_string();

        queue.on_drained(move || debug!(collection = %collection, "pipeline output drained"));

        let scheduler = Scheduler {
            schema,
            source: Box::new(records.into_iter()),
            workers,
            reports: report_receiver,
            queue: queue.clone(),
            report: PipelineReport::default(),
        };

        let slot = report.clone();
        let guard = EndOnDrop(queue.clone());
        thread::Builder::new()
            .name("cipherdex-scheduler".to_string())
            .spawn(move || {
                let _guard = guard;
                let final_report = scheduler.run();
                *slot.lock() = Some(final_report);
            })
            .map_err(|e| Error::new(ErrorKind::InvalidState, format!("failed to spawn scheduler: {}", e)))?;

        Ok(AnalysisStream { queue, report })
    }
}

/// Ends the output when the scheduler thread exits, panicking or not.
struct EndOnDrop(Arc<AsyncQueue<JobOutcome>>);

impl Drop for EndOnDrop {
    fn drop(&mut self) {
        self.0.end();
    }
}

struct Scheduler {
    schema: Arc<CollectionSchema>,
    source: Box<dyn Iterator<Item = Record> + Send>,
    workers: Vec<Worker>,
    reports: Receiver<WorkerReport>,
    queue: Arc<AsyncQueue<JobOutcome>>,
    report: PipelineReport,
}

impl Scheduler {
    fn run(mut self) -> PipelineReport {
        info!(collection = self.schema.name(), workers = self.workers.len(), "analysis pipeline started");

        let mut exhausted = false;
        for worker_id in 0..self.workers.len() {
            if !self.dispatch_next(worker_id) {
                exhausted = true;
                break;
            }
        }

        while !self.report.is_complete() {
            let Ok(WorkerReport { worker_id, outcome }) = self.reports.recv() else {
                warn!(collection = self.schema.name(), "all workers exited with jobs in flight");
                break;
            };

            match outcome {
                Ok(result) => {
                    self.report.success_count += 1;
                    self.emit(JobOutcome::Analyzed(result));
                }
                Err(failure) => {
                    self.report.failure_count += 1;
                    self.report.failures.push(failure.clone());
                    self.emit(JobOutcome::Failed(failure));
                }
            }

            if !exhausted && !self.dispatch_next(worker_id) {
                exhausted = true;
            }
        }

        self.report.workers_terminated = self
            .workers
            .iter_mut()
            .map(|worker| worker.terminate())
            .filter(|stopped| *stopped)
            .count();

        info!(
            collection = self.schema.name(),
            jobs = self.report.job_count,
            succeeded = self.report.success_count,
            failed = self.report.failure_count,
            "analysis pipeline finished"
        );
        self.report
    }

    /// Pulls the next record and gives it to `worker_id`. False once the
    /// source is exhausted or has panicked.
    fn dispatch_next(&mut self, worker_id: usize) -> bool {
        let record = match panic::catch_unwind(AssertUnwindSafe(|| self.source.next())) {
            Ok(Some(record)) => record,
            Ok(None) => return false,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(collection = self.schema.name(), error = %message, "record source panicked");
                self.report.source_failure = Some(message);
                return false;
            }
        };

        self.report.job_count += 1;
        let job = AnalysisJob {
            job_id: self.report.job_count,
            schema: self.schema.clone(),
            record,
        };

        if let Err(job) = self.workers[worker_id].submit(job) {
            let failure = JobFailure {
                job_id: job.job_id,
                record_id: job.record.id,
                worker_id,
                error: Error::new(ErrorKind::Analysis, format!("worker {} is not accepting jobs", worker_id)),
            };
            self.report.failure_count += 1;
            self.report.failures.push(failure.clone());
            self.emit(JobOutcome::Failed(failure));
        }
        true
    }

    fn emit(&self, outcome: JobOutcome) {
        if let Err(e) = self.queue.push(outcome) {
            warn!(error = %e, "dropped pipeline outcome");
        }
    }
}

/// Output of one pipeline run. Outcomes from different records arrive in no
/// particular order.
pub struct AnalysisStream {
    queue: Arc<AsyncQueue<JobOutcome>>,
    report: Arc<Mutex<Option<PipelineReport>>>,
}

impl AnalysisStream {
    pub async fn next(&self) -> Option<JobOutcome> {
        self.queue.next().await
    }

    /// Set once the output has ended.
    pub fn report(&self) -> Option<PipelineReport> {
        self.report.lock().clone()
    }

    /// Drains the stream, returning successful results and the final report.
    /// The report is missing only if the scheduler itself panicked.
    pub async fn collect(self) -> Result<(Vec<AnalysisResult>, PipelineReport)> {
        let mut results = Vec::new();
        while let Some(outcome) = self.next().await {
            if let JobOutcome::Analyzed(result) = outcome {
                results.push(result);
            }
        }

        let report = self
            .report()
            .ok_or_else(|| Error::new(ErrorKind::InvalidState, "pipeline ended without a report"))?;
        Ok((results, report))
    }
}
