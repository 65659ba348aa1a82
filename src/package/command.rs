// src/package/command.rs

use std::time::Duration;

use crate::errors::{InstallError, Result};

/// One shell invocation plus the output it produced on its last run.
///
/// Everything except the output fields is fixed at construction. The output
/// fields are written by the engine and are empty strings until then, or
/// when the capture strategy does not fill them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    error_message: String,
    fatal: bool,
    timeout: Duration,
    before_text: Option<String>,
    after_text: Option<String>,

    stdout: String,
    stderr: String,
    combined: String,
}

impl Command {
    /// Non-fatal, unbounded command. `text` and `error_message` must not be
    /// blank.
    pub fn new(text: impl Into<String>, error_message: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let error_message = error_message.into();

        if text.trim().is_empty() {
            return Err(InstallError::InvalidCommand(
                "command text must not be empty".to_string(),
            ));
        }
        if error_message.trim().is_empty() {
            return Err(InstallError::InvalidCommand(format!(
                "command '{text}' needs a non-empty error message"
            )));
        }

        Ok(Self {
            text,
            error_message,
            fatal: false,
            timeout: Duration::ZERO,
            before_text: None,
            after_text: None,
            stdout: String::new(),
            stderr: String::new(),
            combined: String::new(),
        })
    }

    pub fn fatal(mut self, fatal: bool) -> Self {
        self.fatal = fatal;
        self
    }

    /// Zero means unbounded.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Timeout from signed seconds as found in install data; negative values
    /// are rejected.
    pub fn with_timeout_secs(self, secs: i64) -> Result<Self> {
        let secs = u64::try_from(secs).map_err(|_| {
            InstallError::InvalidCommand(format!(
                "command '{}' has a negative timeout ({secs}s)",
                self.text
            ))
        })?;
        Ok(self.timeout(Duration::from_secs(secs)))
    }

    pub fn before(mut self, text: impl Into<String>) -> Self {
        self.before_text = Some(text.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn after(mut self, text: impl Into<String>) -> Self {
        self.after_text = Some(text.into()).filter(|t: &String| !t.is_empty());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    pub fn before_text(&self) -> Option<&str> {
        self.before_text.as_deref()
    }

    pub fn after_text(&self) -> Option<&str> {
        self.after_text.as_deref()
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn combined(&self) -> &str {
        &self.combined
    }

    pub(crate) fn clear_output(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
        self.combined.clear();
    }

    pub(crate) fn set_stdout(&mut self, out: String) {
        self.stdout = out;
    }

    pub(crate) fn set_stderr(&mut self, out: String) {
        self.stderr = out;
    }

    pub(crate) fn set_combined(&mut self, out: String) {
        self.combined = out;
    }
}
