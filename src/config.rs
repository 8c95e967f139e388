//! Run configuration loaded from a `litspec.toml` file.

use std::path::Path;

use serde::Deserialize;

use crate::errors::{SpecError, SpecResult};

/// Settings for a spec run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Spec selectors to run, `Name` or `Name.method`.
    pub specs: Vec<String>,
    /// Emit ANSI styling in the printed report.
    pub color: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            specs: Vec::new(),
            color: true,
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    run: RunSection,
}

#[derive(Deserialize, Default)]
struct RunSection {
    #[serde(default)]
    specs: Vec<String>,
    color: Option<bool>,
}

impl RunConfig {
    /// Load from a TOML file. A missing file yields the defaults;
    /// unreadable or malformed files are errors.
    pub fn load(path: impl AsRef<Path>) -> SpecResult<RunConfig> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("no config at {}, using defaults", path.display());
            return Ok(RunConfig::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file: ConfigFile = toml::from_str(&text).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(RunConfig {
            specs: file.run.specs,
            color: file.run.color.unwrap_or(true),
        })
    }
}
