// src/detect.rs

//! Work out the `distro:release` target id of the running host.
//!
//! Reads the os-release file (`/etc/os-release`, falling back to
//! `/usr/lib/os-release`) and combines `ID` and `VERSION_ID`, e.g.
//! `ID=ubuntu` + `VERSION_ID="22.04"` gives `ubuntu:22.04`.

use std::path::Path;

use tracing::debug;

use crate::errors::{InstallError, Result};
use crate::fs::FileSystem;

pub const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// Detected host identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub id: String,
    pub version_id: String,
    pub pretty_name: Option<String>,
}

impl HostInfo {
    pub fn target_id(&self) -> String {
        format!("{}:{}", self.id, self.version_id)
    }
}

pub fn detect_target(fs: &dyn FileSystem) -> Result<String> {
    detect_host(fs).map(|host| host.target_id())
}

pub fn detect_host(fs: &dyn FileSystem) -> Result<HostInfo> {
    let path = OS_RELEASE_PATHS
        .iter()
        .map(|p| Path::new(*p))
        .find(|p| fs.is_file(p))
        .ok_or_else(|| {
            InstallError::DetectError(format!(
                "none of {} exists",
                OS_RELEASE_PATHS.join(", ")
            ))
        })?;

    let contents = fs.read_to_string(path)?;
    let host = parse_os_release(&contents).ok_or_else(|| {
        InstallError::DetectError(format!("{} lacks ID or VERSION_ID", path.display()))
    })?;

    debug!(path = %path.display(), target_id = %host.target_id(), "detected host");
    Ok(host)
}

/// Parse os-release `KEY=value` lines. Returns `None` without both `ID` and
/// `VERSION_ID`.
pub fn parse_os_release(contents: &str) -> Option<HostInfo> {
    let mut id = None;
    let mut version_id = None;
    let mut pretty_name = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "ID" => id = Some(value.to_lowercase()),
            "VERSION_ID" => version_id = Some(value.to_lowercase()),
            "PRETTY_NAME" => pretty_name = Some(value.to_string()),
            _ => {}
        }
    }

    Some(HostInfo {
        id: id.filter(|s| !s.is_empty())?,
        version_id: version_id.filter(|s| !s.is_empty())?,
        pretty_name,
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
