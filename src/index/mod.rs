pub mod analyzer;
pub mod extract;
pub mod field_path;
pub mod posting;

pub use analyzer::{AnalyzedRecord, RecordAnalyzer};
pub use field_path::FieldPath;
pub use posting::{build_vectors, IndexVector, Posting};
