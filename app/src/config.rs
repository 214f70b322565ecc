//! Lab configuration
//!
//! Optional TOML file; every field has a default so an empty file (or no
//! file at all) works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Segment used when none is given on the command line
    pub default_segment: String,
    /// Overrides the segment's own persona count when set
    pub persona_count: Option<u32>,
    pub questions_per_interview: usize,
    /// Product template name
    pub default_product: String,
    pub session_path: PathBuf,
    /// Extra segment CSV files merged into the builtin catalog
    pub segment_files: Vec<PathBuf>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            default_segment: "Growing Families".into(),
            persona_count: None,
            questions_per_interview: 8,
            default_product: "FlexSpace System".into(),
            session_path: PathBuf::from("persona-lab-session.json"),
            segment_files: Vec::new(),
        }
    }
}

impl LabConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config file given, using defaults");
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: LabConfig = toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }
}
