// src/engine/strategy.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::terminal::Capture;

/// How a package run captures output and reacts to failures.
///
/// - `Combined`, `Stdout`, `Stderr`: return captured output; any failure
///   aborts the run, whatever the command's `fatal` flag says.
/// - `ErrorOnly`: no output; a failure aborts only if the command is fatal
///   or its shell could not be started.
/// - `Silent`: no output; failures never abort.
///
/// Whatever the strategy, a cancelled engine context aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Combined,
    #[default]
    ErrorOnly,
    Silent,
    Stdout,
    Stderr,
}

/// What the loop does after a command failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    Abort,
    /// Log at error level and go on with the next command.
    Continue,
    /// Swallow the failure.
    Ignore,
}

impl Strategy {
    pub fn capture(self) -> Capture {
        match self {
            Strategy::Combined => Capture::Combined,
            Strategy::ErrorOnly => Capture::ErrorOnly,
            Strategy::Silent => Capture::Silent,
            Strategy::Stdout => Capture::Stdout,
            Strategy::Stderr => Capture::Stderr,
        }
    }

    /// True for the strategies whose run returns captured output.
    pub fn returns_output(self) -> bool {
        matches!(self, Strategy::Combined | Strategy::Stdout | Strategy::Stderr)
    }

    pub fn on_failure(self, fatal: bool) -> FailureAction {
        match self {
            Strategy::Combined | Strategy::Stdout | Strategy::Stderr => FailureAction::Abort,
            Strategy::ErrorOnly if fatal => FailureAction::Abort,
            Strategy::ErrorOnly => FailureAction::Continue,
            Strategy::Silent => FailureAction::Ignore,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Combined => "combined",
            Strategy::ErrorOnly => "error-only",
            Strategy::Silent => "silent",
            Strategy::Stdout => "stdout",
            Strategy::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "combined" => Ok(Strategy::Combined),
            "error-only" | "error_only" => Ok(Strategy::ErrorOnly),
            "silent" => Ok(Strategy::Silent),
            "stdout" => Ok(Strategy::Stdout),
            "stderr" => Ok(Strategy::Stderr),
            other => Err(format!(
                "invalid strategy: {other} (expected combined, error-only, silent, stdout or stderr)"
            )),
        }
    }
}
