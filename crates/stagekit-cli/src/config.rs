use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stagekit_diff::DiffConfig;

use crate::cli::OutputFormat;

/// Defaults loaded from `--config`. Command-line flags win over these.
///
/// ```toml
/// format = "json"
/// sectioned = false
///
/// [diff]
/// section = 2
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub format: OutputFormat,
    pub sectioned: bool,
    pub diff: DiffConfig,
}

impl CliConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
