// src/terminal/mod.rs

//! Terminal abstraction: run one shell command under an [`ExecContext`].
//!
//! The engine talks to a `Terminal` instead of spawning processes itself.
//! Production code uses [`LocalTerminal`]; tests use [`MockTerminal`], which
//! records the commands it is asked to run and answers with programmed
//! output.
//!
//! Every call yields an [`Execution`]: whatever output the [`Capture`] mode
//! retained, plus the error if the command failed. Output gathered before a
//! failure is kept so it can still be logged.

pub mod local;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::context::ExecContext;
use crate::errors::{InstallError, Result};

pub use local::LocalTerminal;
pub use mock::{MockFailure, MockTerminal};

/// Which of a command's output streams are retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// stdout and stderr interleaved in arrival order.
    Combined,
    /// No output; only success or failure.
    ErrorOnly,
    /// Fire-and-forget: no output and failures are swallowed.
    Silent,
    /// stdout only; stderr goes to null.
    Stdout,
    /// stderr only; stdout goes to null.
    Stderr,
}

/// Result of one terminal call.
#[derive(Debug, Default)]
pub struct Execution {
    pub output: Vec<u8>,
    pub error: Option<InstallError>,
}

impl Execution {
    pub fn success(output: Vec<u8>) -> Self {
        Self {
            output,
            error: None,
        }
    }

    pub fn failure(output: Vec<u8>, error: InstallError) -> Self {
        Self {
            output,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<u8>> {
        match self.error {
            None => Ok(self.output),
            Some(err) => Err(err),
        }
    }
}

pub type TerminalFuture<'a> = Pin<Box<dyn Future<Output = Execution> + Send + 'a>>;

/// Runs `shell -c command`.
///
/// `command` is passed through untouched; quoting is the caller's job.
pub trait Terminal: Send + Sync {
    fn execute<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
        capture: Capture,
    ) -> TerminalFuture<'a>;

    fn combined<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.execute(ctx, command, shell, Capture::Combined)
                .await
                .into_result()
        })
    }

    fn error_only<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.execute(ctx, command, shell, Capture::ErrorOnly)
                .await
                .into_result()
                .map(|_| ())
        })
    }

    fn fire_and_forget<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let _ = self.execute(ctx, command, shell, Capture::Silent).await;
        })
    }

    fn stdout_only<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.execute(ctx, command, shell, Capture::Stdout)
                .await
                .into_result()
        })
    }

    fn stderr_only<'a>(
        &'a self,
        ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            self.execute(ctx, command, shell, Capture::Stderr)
                .await
                .into_result()
        })
    }
}
