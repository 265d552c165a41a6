//! Optional YAML defaults file
//!
//! Command-line flags always win; the file only supplies defaults for the
//! durations a pipeline tends to set once per project.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Defaults loaded from `--config`
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Interval between checks
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,

    /// Overall timeout for all checks
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Timeout of read/write operations (TCP checks)
    #[serde(default, with = "humantime_serde")]
    pub iotimeout: Option<Duration>,
}

/// Load a [`FileConfig`] from a YAML file
pub fn load(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

/// Flag beats file beats built-in default
pub fn resolve(flag: Option<Duration>, file: Option<Duration>, default: Duration) -> Duration {
    flag.or(file).unwrap_or(default)
}
