// src/package/target.rs

use super::command::Command;

/// Shell used when a target does not name one.
pub const DEFAULT_SHELL: &str = "bash";

/// One supported installation environment, e.g. `ubuntu:22.04`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub distro: String,
    pub release: String,
    pub os: String,
    pub shell: String,
    pub commands: Vec<Command>,
}

impl Target {
    pub fn new(
        id: impl Into<String>,
        distro: impl Into<String>,
        release: impl Into<String>,
        os: impl Into<String>,
        shell: impl Into<String>,
    ) -> Self {
        let shell = shell.into();
        Self {
            id: id.into(),
            distro: distro.into(),
            release: release.into(),
            os: os.into(),
            shell: if shell.trim().is_empty() {
                DEFAULT_SHELL.to_string()
            } else {
                shell
            },
            commands: Vec::new(),
        }
    }

    /// Case-insensitive exact comparison against `id`.
    pub fn matches(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}
