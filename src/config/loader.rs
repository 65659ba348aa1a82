// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::model::{Plan, RawPlan};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Env var that overrides the default plan location.
pub const PLAN_ENV_VAR: &str = "PROVISIONER_PLAN";

/// Read and deserialize a plan without semantic validation.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawPlan> {
    let contents = fs.read_to_string(path.as_ref())?;
    let raw: RawPlan = toml::from_str(&contents)?;
    Ok(raw)
}

/// Read, deserialize and validate a plan.
///
/// Validation checks phase labels, target ids, command fields and timeouts,
/// and builds one command package per phase.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<Plan> {
    let raw = load_from_path(fs, path)?;
    Plan::try_from(raw)
}

/// `PROVISIONER_PLAN` if set, else `Provision.toml` in the working directory.
pub fn default_plan_path() -> PathBuf {
    std::env::var_os(PLAN_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Provision.toml"))
}
