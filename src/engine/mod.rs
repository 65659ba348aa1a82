// src/engine/mod.rs

//! Execution engine: runs a package's commands for one target, in order.
//!
//! All public strategies share [`Engine::run`]. Per command the loop:
//! 1. derives a context with the command's deadline (if any) from the
//!    engine's parent context,
//! 2. echoes `before` text, runs the command through the [`Terminal`],
//!    records it to the transcript (redacted), stores the captured output on
//!    the command and in the accumulator, echoes `after` text,
//! 3. applies the strategy's [`FailureAction`] if the command failed.
//!
//! The engine never exits the process; failures come back as
//! [`InstallError::CommandFailed`] and the caller decides what to do.

pub mod strategy;

pub use strategy::{FailureAction, Strategy};

use std::sync::Arc;

use tracing::{debug, info};

use crate::context::ExecContext;
use crate::errors::{InstallError, Result};
use crate::logging::{LeveledLogger, Transcript};
use crate::package::CommandPackage;
use crate::redact::Redactor;
use crate::terminal::Terminal;

/// Outcome of one package run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Captured output of every command that ran, in order.
    pub output: Vec<u8>,
    /// Set when the run was aborted (or the target was unknown).
    pub error: Option<InstallError>,
    /// Commands handed to the terminal.
    pub executed: usize,
    /// Failures that did not abort the run.
    pub failures: usize,
}

impl RunReport {
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self.error {
            None => Ok(self.output),
            Some(err) => Err(err),
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    terminal: Arc<dyn Terminal>,
    logger: LeveledLogger,
    redactor: Redactor,
    transcript: Option<Transcript>,
    parent: ExecContext,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("logger", &self.logger)
            .field("transcript", &self.transcript.is_some())
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// The engine redacts with the logger's redactor, so secrets registered
    /// anywhere are scrubbed everywhere.
    pub fn new(terminal: Arc<dyn Terminal>, logger: LeveledLogger) -> Self {
        let redactor = logger.redactor().clone();
        Self {
            terminal,
            logger,
            redactor,
            transcript: None,
            parent: ExecContext::background(),
        }
    }

    pub fn with_transcript(mut self, transcript: Transcript) -> Self {
        self.transcript = Some(transcript);
        self
    }

    /// Parent for every per-command context; cancelling it aborts the
    /// command in flight.
    pub fn with_context(mut self, parent: ExecContext) -> Self {
        self.parent = parent;
        self
    }

    pub fn logger(&self) -> &LeveledLogger {
        &self.logger
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub async fn run_combined(&self, pkg: &mut CommandPackage, target_id: &str) -> Result<Vec<u8>> {
        self.run(pkg, target_id, Strategy::Combined).await
    }

    pub async fn run_error_only(&self, pkg: &mut CommandPackage, target_id: &str) -> Result<()> {
        self.run(pkg, target_id, Strategy::ErrorOnly).await.map(|_| ())
    }

    /// Only an unknown target is reported; command failures are swallowed.
    pub async fn run_silently(&self, pkg: &mut CommandPackage, target_id: &str) -> Result<()> {
        self.run(pkg, target_id, Strategy::Silent).await.map(|_| ())
    }

    pub async fn run_stdout(&self, pkg: &mut CommandPackage, target_id: &str) -> Result<Vec<u8>> {
        self.run(pkg, target_id, Strategy::Stdout).await
    }

    pub async fn run_stderr(&self, pkg: &mut CommandPackage, target_id: &str) -> Result<Vec<u8>> {
        self.run(pkg, target_id, Strategy::Stderr).await
    }

    /// Run every command of `target_id` in `pkg` with `strategy`.
    ///
    /// Returns the concatenated captured output (always empty for
    /// `ErrorOnly` and `Silent`).
    pub async fn run(
        &self,
        pkg: &mut CommandPackage,
        target_id: &str,
        strategy: Strategy,
    ) -> Result<Vec<u8>> {
        self.run_report(pkg, target_id, strategy).await.into_result()
    }

    /// Like [`Engine::run`], but keeps the output gathered before a failure.
    pub async fn run_report(
        &self,
        pkg: &mut CommandPackage,
        target_id: &str,
        strategy: Strategy,
    ) -> RunReport {
        let label = pkg.label().to_string();
        let redact = pkg.redact;
        let transcript = self.transcript.as_ref().filter(|_| pkg.transcript);
        self.redactor.add_secrets(pkg.sensitive.iter().cloned());

        let mut report = RunReport::default();

        let target = match pkg.find_target_mut(target_id) {
            Ok(target) => target,
            Err(err) => {
                self.logger.error(err.to_string());
                report.error = Some(err);
                return report;
            }
        };
        let shell = target.shell.clone();
        let total = target.commands.len();

        info!(
            package = %label,
            target_id = %target.id,
            %strategy,
            commands = total,
            "running command package"
        );

        for (idx, command) in target.commands.iter_mut().enumerate() {
            // Nothing is spawned once the parent context has fired.
            if let Some(reason) = self.parent.interrupted() {
                let err = reason.into_error();
                self.logger.error(format!(
                    "package '{label}' interrupted before step {} of {total}: {err}",
                    idx + 1
                ));
                report.error = Some(err);
                return report;
            }

            command.clear_output();
            let shown = self.scrub(redact, command.text());
            debug!(package = %label, step = idx + 1, total, cmd = %shown, "running command");

            if let Some(before) = command.before_text() {
                self.logger.echo(before);
            }

            let execution = {
                // Dropped right after the call so its deadline does not
                // outlive the command.
                let ctx = self.parent.with_timeout(command.timeout_duration());
                self.terminal
                    .execute(&ctx, command.text(), &shell, strategy.capture())
                    .await
            };
            report.executed += 1;

            let output = String::from_utf8_lossy(&execution.output).into_owned();

            if let Some(transcript) = transcript {
                transcript.record(
                    &Transcript::prefix_for(&label),
                    &shown,
                    &self.scrub(redact, &output),
                );
            }

            match strategy {
                Strategy::Combined => command.set_combined(output),
                Strategy::Stdout => command.set_stdout(output),
                Strategy::Stderr => command.set_stderr(output),
                Strategy::ErrorOnly | Strategy::Silent => {}
            }
            if strategy.returns_output() {
                report.output.extend_from_slice(&execution.output);
            }

            if let Some(after) = command.after_text() {
                self.logger.echo(after);
            }

            // A fired parent aborts every strategy, including silent runs
            // whose terminal swallowed the interruption.
            let interrupted = self.parent.interrupted();
            let err = match (execution.error, interrupted) {
                (Some(err), _) => err,
                (None, Some(reason)) => reason.into_error(),
                (None, None) => {
                    self.logger.trace(format!("command succeeded: {shown}"));
                    continue;
                }
            };

            let action = if interrupted.is_some() {
                FailureAction::Abort
            } else {
                // A shell that cannot be launched fails every later command too.
                strategy.on_failure(command.is_fatal() || err.is_start())
            };
            let failure = InstallError::CommandFailed {
                message: self.scrub(redact, command.error_message()),
                source: Box::new(err),
            };

            match action {
                FailureAction::Abort => {
                    self.logger.error(format!(
                        "{failure} (package '{label}', step {} of {total}: {shown})",
                        idx + 1
                    ));
                    report.error = Some(failure);
                    return report;
                }
                FailureAction::Continue => {
                    self.logger.error(format!(
                        "non-fatal: {failure} (package '{label}', step {} of {total}: {shown})",
                        idx + 1
                    ));
                    report.failures += 1;
                }
                FailureAction::Ignore => {
                    self.logger
                        .trace(format!("ignored failure: {failure} ({shown})"));
                    report.failures += 1;
                }
            }
        }

        debug!(
            package = %label,
            bytes = report.output.len(),
            failures = report.failures,
            "command package finished"
        );
        report
    }

    fn scrub(&self, redact: bool, text: &str) -> String {
        if redact {
            self.redactor.redact(text)
        } else {
            text.to_string()
        }
    }
}
