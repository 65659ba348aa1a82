// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::engine::Strategy;
use crate::package::CommandPackage;

/// Install plan exactly as read from TOML.
///
/// ```toml
/// [install]
/// log_file = "provision.log"
/// target = "ubuntu:22.04"
///
/// [secrets]
/// env = ["DB_PASSWORD"]
///
/// [[phase]]
/// label = "bootstrap"
/// strategy = "error-only"
///
/// [[phase.target]]
/// id = "ubuntu:22.04"
/// distro = "Ubuntu"
/// release = "22.04"
///
/// [[phase.target.command]]
/// cmd = "apt-get update"
/// error = "Unable to update apt"
/// fatal = true
/// timeout = "5m"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPlan {
    #[serde(default)]
    pub install: InstallSection,

    #[serde(default)]
    pub secrets: SecretsSection,

    #[serde(default)]
    pub phase: Vec<PhaseConfig>,
}

/// `[install]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallSection {
    /// Leveled install log; appended to.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Command transcript; only written for phases with `transcript = true`.
    #[serde(default)]
    pub transcript_file: Option<PathBuf>,

    /// Write trace-level lines to the install log.
    #[serde(default)]
    pub trace: bool,

    /// Suppress operator echo on stdout.
    #[serde(default)]
    pub quiet: bool,

    /// Global redaction switch.
    #[serde(default = "default_true")]
    pub redact: bool,

    /// Explicit `distro:release`; detected from the host when absent.
    #[serde(default)]
    pub target: Option<String>,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("provision.log")
}

fn default_true() -> bool {
    true
}

impl Default for InstallSection {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            transcript_file: None,
            trace: false,
            quiet: false,
            redact: true,
            target: None,
        }
    }
}

/// `[secrets]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecretsSection {
    /// Literal sensitive values.
    #[serde(default)]
    pub values: Vec<String>,

    /// Names of environment variables whose values are sensitive.
    #[serde(default)]
    pub env: Vec<String>,
}

impl SecretsSection {
    /// Literal values plus the current values of the listed env vars.
    ///
    /// Unset variables are skipped with a warning.
    pub fn resolve(&self) -> Vec<String> {
        let mut out: Vec<String> = self.values.clone();
        for name in &self.env {
            match std::env::var(name) {
                Ok(value) if !value.is_empty() => out.push(value),
                _ => warn!(var = %name, "secret environment variable is not set"),
            }
        }
        out
    }
}

/// `[[phase]]` table: one command package.
#[derive(Debug, Clone, Deserialize)]
pub struct PhaseConfig {
    pub label: String,

    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default = "default_true")]
    pub redact: bool,

    #[serde(default)]
    pub transcript: bool,

    /// Phase-specific sensitive values.
    #[serde(default)]
    pub sensitive: Vec<String>,

    #[serde(default)]
    pub target: Vec<TargetConfig>,
}

/// `[[phase.target]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    pub id: String,

    #[serde(default)]
    pub distro: String,

    #[serde(default)]
    pub release: String,

    #[serde(default = "default_os")]
    pub os: String,

    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default)]
    pub command: Vec<CommandConfig>,
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_shell() -> String {
    crate::package::DEFAULT_SHELL.to_string()
}

/// `[[phase.target.command]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandConfig {
    pub cmd: String,

    pub error: String,

    #[serde(default)]
    pub fatal: bool,

    /// Integer seconds or a duration string such as `"90s"` or `"5m"`.
    #[serde(default)]
    pub timeout: Option<TimeoutSpec>,

    #[serde(default)]
    pub before: Option<String>,

    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TimeoutSpec {
    Seconds(i64),
    Text(String),
}

/// One validated phase, ready to run.
#[derive(Debug, Clone)]
pub struct Phase {
    pub strategy: Strategy,
    pub package: CommandPackage,
}

impl Phase {
    pub fn label(&self) -> &str {
        self.package.label()
    }
}

/// Validated install plan.
///
/// Only obtainable through `Plan::try_from(RawPlan)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct Plan {
    install: InstallSection,
    secrets: SecretsSection,
    phases: Vec<Phase>,
}

impl Plan {
    pub(crate) fn new_unchecked(
        install: InstallSection,
        secrets: SecretsSection,
        phases: Vec<Phase>,
    ) -> Self {
        Self {
            install,
            secrets,
            phases,
        }
    }

    pub fn install(&self) -> &InstallSection {
        &self.install
    }

    pub fn secrets(&self) -> &SecretsSection {
        &self.secrets
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<Phase> {
        self.phases
    }

    pub fn phase(&self, label: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.label() == label)
    }
}
