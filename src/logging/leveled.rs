// src/logging/leveled.rs

//! The install log: four severities, one shared sink, every line redacted.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::errors::Result;
use crate::redact::Redactor;

use super::{SharedWriter, shared_writer, write_shared};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Trace,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Leveled, redacting logger.
///
/// Clones share the sink, the console writer and the redactor, so the engine
/// and the installer can each hold one.
#[derive(Clone)]
pub struct LeveledLogger {
    sink: SharedWriter,
    console: SharedWriter,
    redactor: Redactor,
    trace_enabled: bool,
    quiet: bool,
    sink_failed: Arc<AtomicBool>,
}

impl fmt::Debug for LeveledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeveledLogger")
            .field("trace_enabled", &self.trace_enabled)
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl LeveledLogger {
    /// Logger writing to `sink`, echoing to stdout.
    pub fn new(sink: impl Write + Send + 'static, redactor: Redactor) -> Self {
        Self {
            sink: shared_writer(sink),
            console: shared_writer(std::io::stdout()),
            redactor,
            trace_enabled: false,
            quiet: false,
            sink_failed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open (append to) a log file on disk.
    pub fn open(path: impl AsRef<Path>, redactor: Redactor) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(file, redactor))
    }

    pub fn with_console(mut self, console: impl Write + Send + 'static) -> Self {
        self.console = shared_writer(console);
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn trace(&self, msg: impl AsRef<str>) {
        if !self.trace_enabled {
            return;
        }
        self.write(Level::Trace, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.write(Level::Info, msg.as_ref());
    }

    pub fn warning(&self, msg: impl AsRef<str>) {
        self.write(Level::Warning, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.write(Level::Error, msg.as_ref());
    }

    /// Operator-facing text on the console; suppressed when quiet.
    pub fn echo(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        let mut line = self.redactor.redact(msg.as_ref());
        line.push('\n');
        if let Err(e) = write_shared(&self.console, line.as_bytes()) {
            warn!(error = %e, "failed to write to console");
        }
    }

    fn write(&self, level: Level, msg: &str) {
        let line = format!(
            "{} [{}] {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            self.redactor.redact(msg)
        );

        if let Err(e) = write_shared(&self.sink, line.as_bytes()) {
            // Report a broken sink once rather than on every line.
            if !self.sink_failed.swap(true, Ordering::Relaxed) {
                warn!(error = %e, "failed to write to install log");
            }
        }
    }
}
