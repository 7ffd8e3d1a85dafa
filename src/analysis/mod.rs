pub mod config;
pub mod filters;
pub mod pipeline;
pub mod processor;
pub mod tokenizer;

pub use config::{MatchOptions, TokenFilterConfig, TokenizerConfig};
pub use pipeline::TextPipeline;
pub use processor::TextProcessor;
