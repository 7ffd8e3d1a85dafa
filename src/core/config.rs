use std::env;
use std::str::FromStr;
use crate::core::error::{Error, ErrorKind, Result};

pub const ENV_WORKERS: &str = "CIPHERDEX_WORKERS";
pub const ENV_ANALYZER_CACHE: &str = "CIPHERDEX_ANALYZER_CACHE";
pub const ENV_CIPHER_CACHE: &str = "CIPHERDEX_CIPHER_CACHE";
pub const ENV_QUERY_LIMIT: &str = "CIPHERDEX_QUERY_LIMIT";

#[derive(Debug, Clone)]
pub struct Config {
    pub worker_count: usize,            // Bulk pipeline workers, one per core
    pub analyzer_cache_capacity: usize, // Per-worker analyzers, keyed by schema name
    pub cipher_cache_capacity: usize,   // Per-worker initialised index ciphers
    pub default_query_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            worker_count: num_cpus::get(),
            analyzer_cache_capacity: 16,
            cipher_cache_capacity: 1024,
            default_query_limit: 50,
        }
    }
}

impl Config {
    /// Defaults overlaid with any `CIPHERDEX_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(workers) = parse_var::<usize>(&lookup, ENV_WORKERS)? {
            config.worker_count = workers;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_ANALYZER_CACHE)? {
            config.analyzer_cache_capacity = capacity;
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_CIPHER_CACHE)? {
            config.cipher_cache_capacity = capacity;
        }
        if let Some(limit) = parse_var::<u32>(&lookup, ENV_QUERY_LIMIT)? {
            config.default_query_limit = limit;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "worker_count must be at least 1"));
        }
        if self.analyzer_cache_capacity == 0 || self.cipher_cache_capacity == 0 {
            return Err(Error::new(ErrorKind::InvalidArgument, "cache capacities must be at least 1"));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::new(
                ErrorKind::InvalidArgument,
                format!("environment variable {} has invalid value '{}'", name, raw),
            )
        }),
    }
}
