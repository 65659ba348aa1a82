// src/logging/transcript.rs

//! Optional command transcript.
//!
//! Every executed command is appended as
//!
//! ```text
//! <timestamp> <label> # <command>
//! <output>
//! ```
//!
//! Callers pass text that is already redacted.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

use crate::errors::Result;

use super::{SharedWriter, shared_writer, write_shared};

#[derive(Clone)]
pub struct Transcript {
    sink: SharedWriter,
}

impl fmt::Debug for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcript").finish_non_exhaustive()
    }
}

impl Transcript {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: shared_writer(sink),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::new(file))
    }

    /// Prefix used for entries recorded on behalf of package `label`.
    pub fn prefix_for(label: &str) -> String {
        format!(
            "{} {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            label
        )
    }

    pub fn record(&self, prefix: &str, command: &str, output: &str) {
        let mut entry = format!("{prefix} # {command}\n{output}");
        if !entry.ends_with('\n') {
            entry.push('\n');
        }

        if let Err(e) = write_shared(&self.sink, entry.as_bytes()) {
            warn!(error = %e, "failed to write command transcript");
        }
    }
}
