// src/logging/mod.rs

//! Logging for `provisioner`.
//!
//! Two separate channels exist:
//! - Diagnostics via `tracing` + `tracing-subscriber`, sent to STDERR and
//!   initialised once by [`init_logging`].
//! - The install log proper: [`LeveledLogger`] writes redacted, timestamped
//!   lines to the install log file and mirrors operator-facing text to the
//!   console. [`Transcript`] is the optional per-command side channel.
//!
//! The diagnostics filter comes from `--log-level`, else `PROVISIONER_LOG`,
//! else `info`.

pub mod leveled;
pub mod transcript;

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub use leveled::{Level, LeveledLogger};
pub use transcript::Transcript;

/// Writer shared between clones of a logger.
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub(crate) fn shared_writer(writer: impl Write + Send + 'static) -> SharedWriter {
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Write one chunk to a shared writer and flush it.
pub(crate) fn write_shared(writer: &SharedWriter, bytes: &[u8]) -> std::io::Result<()> {
    let mut guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.write_all(bytes)?;
    guard.flush()
}

/// Env var holding a `tracing` filter directive such as `debug` or
/// `provisioner::terminal=trace,info`.
pub const LOG_ENV_VAR: &str = "PROVISIONER_LOG";

/// Install the diagnostics subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.directive()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // stdout belongs to the operator echo.
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
