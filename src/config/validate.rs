// src/config/validate.rs

use std::collections::HashSet;
use std::time::Duration;

use crate::config::model::{CommandConfig, Phase, PhaseConfig, Plan, RawPlan, TimeoutSpec};
use crate::errors::{InstallError, Result};
use crate::package::{Command, CommandPackage};

impl TryFrom<RawPlan> for Plan {
    type Error = InstallError;

    fn try_from(raw: RawPlan) -> std::result::Result<Self, Self::Error> {
        ensure_has_phases(&raw)?;
        ensure_unique_labels(&raw)?;

        let phases = raw
            .phase
            .iter()
            .map(build_phase)
            .collect::<Result<Vec<_>>>()?;

        Ok(Plan::new_unchecked(raw.install, raw.secrets, phases))
    }
}

fn ensure_has_phases(raw: &RawPlan) -> Result<()> {
    if raw.phase.is_empty() {
        return Err(InstallError::ConfigError(
            "plan must contain at least one [[phase]] table".to_string(),
        ));
    }
    Ok(())
}

fn ensure_unique_labels(raw: &RawPlan) -> Result<()> {
    let mut seen = HashSet::new();
    for phase in &raw.phase {
        let label = phase.label.trim();
        if label.is_empty() {
            return Err(InstallError::ConfigError(
                "phase label must not be empty".to_string(),
            ));
        }
        if !seen.insert(label) {
            return Err(InstallError::ConfigError(format!(
                "duplicate phase label '{label}'"
            )));
        }
    }
    Ok(())
}

fn build_phase(cfg: &PhaseConfig) -> Result<Phase> {
    let mut package = CommandPackage::new(cfg.label.trim());
    package.redact = cfg.redact;
    package.transcript = cfg.transcript;
    for value in &cfg.sensitive {
        package.add_sensitive(value.clone());
    }

    let mut ids = HashSet::new();
    for target in &cfg.target {
        let id = target.id.trim();
        if id.is_empty() {
            return Err(InstallError::ConfigError(format!(
                "phase '{}' has a target without an id",
                cfg.label
            )));
        }
        if !ids.insert(id.to_lowercase()) {
            return Err(InstallError::ConfigError(format!(
                "phase '{}' registers target '{}' twice",
                cfg.label, id
            )));
        }

        package.add_target(id, &target.distro, &target.release, &target.os, &target.shell);

        let commands = target
            .command
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                build_command(c).map_err(|e| {
                    InstallError::ConfigError(format!(
                        "phase '{}', target '{}', command #{}: {}",
                        cfg.label,
                        id,
                        idx + 1,
                        e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        package.load_commands(commands, id)?;
    }

    Ok(Phase {
        strategy: cfg.strategy,
        package,
    })
}

fn build_command(cfg: &CommandConfig) -> Result<Command> {
    let mut command = Command::new(cfg.cmd.as_str(), cfg.error.as_str())?.fatal(cfg.fatal);

    command = match &cfg.timeout {
        None => command,
        Some(TimeoutSpec::Seconds(secs)) => command.with_timeout_secs(*secs)?,
        Some(TimeoutSpec::Text(text)) => command.timeout(
            parse_duration(text).map_err(InstallError::InvalidCommand)?,
        ),
    };

    if let Some(before) = &cfg.before {
        command = command.before(before.as_str());
    }
    if let Some(after) = &cfg.after {
        command = command.after(after.as_str());
    }

    Ok(command)
}

/// Parse a timeout such as `"500ms"`, `"30s"`, `"5m"`, `"1h"` or a bare
/// number of seconds. `"0"` means unbounded; negative values are rejected.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    if s.starts_with('-') {
        return Err(format!("negative timeout '{s}'"));
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => scaled_secs(value, 60),
        "h" => scaled_secs(value, 60 * 60),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

fn scaled_secs(value: u64, factor: u64) -> std::result::Result<Duration, String> {
    value
        .checked_mul(factor)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration too large: {value} x {factor}s"))
}
