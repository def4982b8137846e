//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--verbose` on the command line (`debug`)
//! 2. `TASKWRIGHT_LOG` environment variable (any `EnvFilter` directive)
//! 3. default to `warn`
//!
//! Logs go to stderr so task output on stdout stays untouched.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "TASKWRIGHT_LOG";

/// Initialise the global logging subscriber
pub fn init_logging(verbose: bool) -> Result<()> {
    fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
}
