// src/package/mod.rs

//! Command packages and the target registry.
//!
//! A [`CommandPackage`] is one installation phase ("bootstrap",
//! "database-prep", ...). It holds one [`Target`] per supported
//! `distro:release`, each with its own ordered list of [`Command`]s.
//!
//! Lookup is data-driven and strict: a target id matches only when it is
//! equal ignoring ASCII case. There is no prefix, wildcard or fallback
//! matching, so every supported pair must be registered explicitly.

pub mod command;
pub mod target;

pub use command::Command;
pub use target::{DEFAULT_SHELL, Target};

use tracing::debug;

use crate::errors::{InstallError, Result};

#[derive(Debug, Clone)]
pub struct CommandPackage {
    label: String,
    targets: Vec<Target>,

    /// Redact command text, output and error messages produced by this
    /// package. On by default.
    pub redact: bool,

    /// Sensitive values specific to this package. They are registered with
    /// the engine's redactor when the package is run.
    pub sensitive: Vec<String>,

    /// Mirror every command and its output to the engine's transcript.
    /// Off by default.
    pub transcript: bool,
}

impl CommandPackage {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            targets: Vec::new(),
            redact: true,
            sensitive: Vec::new(),
            transcript: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target_ids(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.id.as_str())
    }

    /// Register a new, empty target.
    pub fn add_target(
        &mut self,
        id: impl Into<String>,
        distro: impl Into<String>,
        release: impl Into<String>,
        os: impl Into<String>,
        shell: impl Into<String>,
    ) -> &mut Target {
        let target = Target::new(id, distro, release, os, shell);
        debug!(package = %self.label, target_id = %target.id, "registered target");
        self.targets.push(target);
        let last = self.targets.len() - 1;
        &mut self.targets[last]
    }

    pub fn find_target(&self, id: &str) -> Result<&Target> {
        self.targets
            .iter()
            .find(|t| t.matches(id))
            .ok_or_else(|| self.not_found(id))
    }

    pub fn find_target_mut(&mut self, id: &str) -> Result<&mut Target> {
        match self.targets.iter().position(|t| t.matches(id)) {
            Some(idx) => Ok(&mut self.targets[idx]),
            None => Err(self.not_found(id)),
        }
    }

    /// Append a batch of commands to an existing target.
    pub fn load_commands(
        &mut self,
        commands: impl IntoIterator<Item = Command>,
        id: &str,
    ) -> Result<()> {
        let target = self.find_target_mut(id)?;
        target.commands.extend(commands);
        Ok(())
    }

    pub fn add_command(&mut self, command: Command, id: &str) -> Result<()> {
        self.find_target_mut(id)?.commands.push(command);
        Ok(())
    }

    pub fn add_sensitive(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.sensitive.push(value);
        }
    }

    fn not_found(&self, id: &str) -> InstallError {
        InstallError::TargetNotFound(format!(
            "'{}' is not registered in package '{}'",
            id, self.label
        ))
    }
}
