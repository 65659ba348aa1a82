// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `provisioner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "provisioner",
    version,
    about = "Unattended installer: runs per-distribution command packages phase by phase.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the install plan (TOML).
    ///
    /// Default: `PROVISIONER_PLAN`, else `Provision.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub plan: Option<PathBuf>,

    /// Target as `distro:release` (e.g. `ubuntu:22.04`).
    ///
    /// Overrides `[install].target` and host detection.
    #[arg(long, value_name = "ID")]
    pub target: Option<String>,

    /// Run only the named phase(s); may be repeated. Plan order is kept.
    #[arg(long = "phase", value_name = "LABEL")]
    pub phases: Vec<String>,

    /// Diagnostics level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROVISIONER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Do not echo progress to stdout.
    #[arg(long)]
    pub quiet: bool,

    /// Write trace-level lines to the install log.
    #[arg(long)]
    pub trace: bool,

    /// Validate the plan and print the commands for the target, but don't
    /// execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
