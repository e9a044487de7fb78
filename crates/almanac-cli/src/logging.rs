//! Tracing subscriber for the `almanac` binary.
//!
//! Events go to stderr so stdout stays a clean JSON/NDJSON channel. The
//! `ALMANAC_LOG` environment variable takes precedence over `--log-level` and
//! accepts full `EnvFilter` directives (for example `almanac_core=trace`).

use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "ALMANAC_LOG";

/// Installs the global subscriber. Returns `false` when one was already set,
/// in which case events keep flowing to the existing one.
pub fn init(level: LogLevel) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
    {
        Ok(()) => true,
        Err(error) => {
            tracing::debug!(%error, "tracing subscriber already installed");
            false
        }
    }
}
