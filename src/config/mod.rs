// src/config/mod.rs

//! Install plan loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file through a [`crate::fs::FileSystem`] (`loader.rs`).
//! - Validate it and build one command package per phase (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_plan_path, load_and_validate, load_from_path};
pub use model::{
    CommandConfig, InstallSection, Phase, PhaseConfig, Plan, RawPlan, SecretsSection,
    TargetConfig, TimeoutSpec,
};
pub use validate::parse_duration;
