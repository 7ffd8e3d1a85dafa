use std::env;
use tracing_subscriber::EnvFilter;

pub const ENV_DEBUG: &str = "CIPHERDEX_DEBUG";

/// Installs a global fmt subscriber. `RUST_LOG` wins when set; otherwise
/// `CIPHERDEX_DEBUG=yes` selects debug output and anything else errors only.
/// Calling this more than once leaves the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(env::var(ENV_DEBUG).ok().as_deref())));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn default_level(debug: Option<&str>) -> &'static str {
    match debug {
        Some("yes") => "debug",
        _ => "error",
    }
}
