//! The `--config` file: filter settings and DOT colour overrides.
//!
//! ```toml
//! [filters]
//! exclude_libraries = [".*Test.*"]
//! exclude_kinds = [".tbd"]
//!
//! [colors]
//! cycle_stroke = "#d70015"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use linkgraph_core::FilterConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub filters: FilterConfig,
    /// Palette slot name → `#rrggbb`. Validated when the palette is built.
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl FileConfig {
    /// Load `path`, or the default config when no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str::<Self>(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }
}
