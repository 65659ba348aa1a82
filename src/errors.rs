// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Process failures are split so callers can tell them apart:
//! - [`InstallError::Start`]: the shell could not be launched at all.
//! - [`InstallError::Exit`]: the process ran and exited non-zero.
//! - [`InstallError::Timeout`] / [`InstallError::Cancelled`]: the exec
//!   context fired before the process exited and the child was killed.
//!
//! The engine wraps any of these in [`InstallError::CommandFailed`] together
//! with the command's human-readable error message.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unable to detect target: {0}")]
    DetectError(String),

    #[error("failed to start `{shell}`: {source}")]
    Start {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", exit_description(.code))]
    Exit { code: Option<i32> },

    #[error("deadline exceeded before the command completed; process killed")]
    Timeout,

    #[error("command cancelled before it completed; process killed")]
    Cancelled,

    #[error("{message}: {source}")]
    CommandFailed {
        message: String,
        #[source]
        source: Box<InstallError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InstallError {
    /// True when this error (or the error it wraps) is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        match self {
            InstallError::Timeout => true,
            InstallError::CommandFailed { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// True for a non-zero exit, directly or wrapped.
    pub fn is_exit(&self) -> bool {
        match self {
            InstallError::Exit { .. } => true,
            InstallError::CommandFailed { source, .. } => source.is_exit(),
            _ => false,
        }
    }

    /// True when the process could not be launched, directly or wrapped.
    pub fn is_start(&self) -> bool {
        match self {
            InstallError::Start { .. } => true,
            InstallError::CommandFailed { source, .. } => source.is_start(),
            _ => false,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("command exited with status {code}"),
        None => "command terminated by signal".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, InstallError>;
