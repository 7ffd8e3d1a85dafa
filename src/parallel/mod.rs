pub mod queue;
pub mod runner;
pub mod worker;

pub use queue::AsyncQueue;
pub use runner::{AnalysisRunner, AnalysisStream, JobOutcome, PipelineReport};
pub use worker::{AnalysisJob, AnalysisResult, JobFailure};
