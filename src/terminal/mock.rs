// src/terminal/mock.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::context::ExecContext;
use crate::errors::InstallError;

use super::{Capture, Execution, Terminal, TerminalFuture};

/// Failure a [`MockTerminal`] can be programmed to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Process "ran" and exited with this status.
    Exit(i32),
    /// Process could not be started.
    Start,
    Timeout,
    Cancelled,
}

impl MockFailure {
    fn to_error(self, shell: &str) -> InstallError {
        match self {
            MockFailure::Exit(code) => InstallError::Exit { code: Some(code) },
            MockFailure::Start => InstallError::Start {
                shell: shell.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "mock start failure"),
            },
            MockFailure::Timeout => InstallError::Timeout,
            MockFailure::Cancelled => InstallError::Cancelled,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Response {
    output: Vec<u8>,
    failure: Option<MockFailure>,
}

/// One recorded terminal call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub command: String,
    pub shell: String,
    pub capture: Capture,
}

#[derive(Debug, Default)]
struct MockState {
    default: Response,
    per_command: HashMap<String, Response>,
    calls: Vec<MockCall>,
}

/// Terminal that never spawns anything.
///
/// Every call is recorded and answered with the programmed output/failure,
/// whatever the capture mode. A response registered for an exact command
/// string with [`MockTerminal::respond_to`] wins over the default one.
/// Clones share state, so a test can keep a handle after giving one to the
/// engine.
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    state: Arc<Mutex<MockState>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_output(self, output: impl Into<Vec<u8>>) -> Self {
        self.set_output(output);
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.set_failure(Some(failure));
        self
    }

    pub fn set_output(&self, output: impl Into<Vec<u8>>) {
        self.lock().default.output = output.into();
    }

    pub fn set_failure(&self, failure: Option<MockFailure>) {
        self.lock().default.failure = failure;
    }

    /// Program the answer for one exact command string.
    pub fn respond_to(
        &self,
        command: impl Into<String>,
        output: impl Into<Vec<u8>>,
        failure: Option<MockFailure>,
    ) {
        self.lock().per_command.insert(
            command.into(),
            Response {
                output: output.into(),
                failure,
            },
        );
    }

    pub fn last_command(&self) -> Option<String> {
        self.lock().calls.last().map(|c| c.command.clone())
    }

    pub fn commands(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.command.clone()).collect()
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Terminal for MockTerminal {
    fn execute<'a>(
        &'a self,
        _ctx: &'a ExecContext,
        command: &'a str,
        shell: &'a str,
        capture: Capture,
    ) -> TerminalFuture<'a> {
        let response = {
            let mut state = self.lock();
            state.calls.push(MockCall {
                command: command.to_string(),
                shell: shell.to_string(),
                capture,
            });
            state
                .per_command
                .get(command)
                .cloned()
                .unwrap_or_else(|| state.default.clone())
        };

        Box::pin(async move {
            match response.failure {
                None => Execution::success(response.output),
                Some(failure) => Execution::failure(response.output, failure.to_error(shell)),
            }
        })
    }
}
