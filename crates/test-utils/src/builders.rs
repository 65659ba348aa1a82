#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use provisioner::engine::Engine;
use provisioner::logging::{LeveledLogger, Transcript};
use provisioner::package::{Command, CommandPackage};
use provisioner::redact::Redactor;
use provisioner::terminal::Terminal;

use crate::buffer::SharedBuffer;

/// Builder for `CommandPackage` with a single target.
pub struct PackageBuilder {
    package: CommandPackage,
    target: String,
}

impl PackageBuilder {
    /// Package `label` with one registered target `target_id` (bash shell).
    pub fn new(label: &str, target_id: &str) -> Self {
        let mut package = CommandPackage::new(label);
        package.add_target(target_id, "Ubuntu", "22.04", "linux", "bash");
        Self {
            package,
            target: target_id.to_string(),
        }
    }

    pub fn command(mut self, command: Command) -> Self {
        self.package
            .add_command(command, &self.target)
            .expect("target registered in PackageBuilder::new");
        self
    }

    pub fn commands(mut self, commands: Vec<Command>) -> Self {
        self.package
            .load_commands(commands, &self.target)
            .expect("target registered in PackageBuilder::new");
        self
    }

    pub fn redact(mut self, redact: bool) -> Self {
        self.package.redact = redact;
        self
    }

    pub fn transcript(mut self, transcript: bool) -> Self {
        self.package.transcript = transcript;
        self
    }

    pub fn sensitive(mut self, value: &str) -> Self {
        self.package.add_sensitive(value);
        self
    }

    pub fn build(self) -> CommandPackage {
        self.package
    }
}

/// Builder for `Command` that panics on invalid input.
pub struct CommandBuilder {
    command: Command,
}

impl CommandBuilder {
    pub fn new(text: &str) -> Self {
        Self {
            command: Command::new(text, format!("failed: {text}")).expect("valid command"),
        }
    }

    pub fn with_error(text: &str, error_message: &str) -> Self {
        Self {
            command: Command::new(text, error_message).expect("valid command"),
        }
    }

    pub fn fatal(mut self) -> Self {
        self.command = self.command.fatal(true);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.command = self.command.timeout(timeout);
        self
    }

    pub fn before(mut self, text: &str) -> Self {
        self.command = self.command.before(text);
        self
    }

    pub fn after(mut self, text: &str) -> Self {
        self.command = self.command.after(text);
        self
    }

    pub fn build(self) -> Command {
        self.command
    }
}

/// Engine wired to in-memory sinks.
pub struct TestEngine {
    pub engine: Engine,
    pub log: SharedBuffer,
    pub console: SharedBuffer,
    pub transcript: SharedBuffer,
    pub redactor: Redactor,
}

impl TestEngine {
    pub fn new(terminal: Arc<dyn Terminal>) -> Self {
        Self::with_redactor(terminal, Redactor::default())
    }

    pub fn with_redactor(terminal: Arc<dyn Terminal>, redactor: Redactor) -> Self {
        let log = SharedBuffer::new();
        let console = SharedBuffer::new();
        let transcript = SharedBuffer::new();

        let logger = LeveledLogger::new(log.clone(), redactor.clone())
            .with_console(console.clone())
            .with_trace(true);

        let engine =
            Engine::new(terminal, logger).with_transcript(Transcript::new(transcript.clone()));

        Self {
            engine,
            log,
            console,
            transcript,
            redactor,
        }
    }
}
