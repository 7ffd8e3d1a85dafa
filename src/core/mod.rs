pub mod collection;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;
