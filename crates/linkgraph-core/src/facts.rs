//! Graph-construction facts as an interchange format.
//!
//! Ingestion collaborators (project-file parsers, build-log scrapers) emit a
//! flat list of facts; the engine applies them to a [`GraphStore`] in order.
//! Application is order-independent, so collaborators need not sort.
//!
//! ```json
//! { "facts": [
//!   { "fact": "target",  "name": "App" },
//!   { "fact": "library", "name": "Kit", "kind": ".framework", "is_system": false },
//!   { "fact": "edge",    "from": "App", "to": "Kit" }
//! ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::FactError;
use crate::graph::GraphStore;
use crate::model::LibraryKind;

/// One graph-construction fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "fact", rename_all = "snake_case")]
pub enum Fact {
    Target {
        name: String,
    },
    Library {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(default)]
        is_system: bool,
        #[serde(default)]
        kind: LibraryKind,
    },
    Edge {
        from: String,
        to: String,
    },
}

/// A fact file on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactFile {
    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl FactFile {
    /// Read and parse a JSON fact file.
    ///
    /// # Errors
    ///
    /// [`FactError::Read`] if the file cannot be read, [`FactError::Malformed`]
    /// if it is not a valid fact document.
    pub fn load(path: &Path) -> Result<Self, FactError> {
        let text = std::fs::read_to_string(path).map_err(|source| FactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::from_json_str(&text)?;
        debug!(path = %path.display(), facts = file.facts.len(), "loaded fact file");
        Ok(file)
    }

    /// Parse a JSON fact document.
    ///
    /// # Errors
    ///
    /// [`FactError::Malformed`] on invalid JSON or unknown fact shapes.
    pub fn from_json_str(text: &str) -> Result<Self, FactError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl GraphStore {
    /// Build a store from facts.
    #[must_use]
    pub fn from_facts<'a>(facts: impl IntoIterator<Item = &'a Fact>) -> Self {
        let mut store = Self::new();
        store.ingest(facts);
        store
    }

    /// Apply facts in order. Malformed facts are ignored the same way the
    /// individual registration calls ignore them.
    #[instrument(skip_all)]
    pub fn ingest<'a>(&mut self, facts: impl IntoIterator<Item = &'a Fact>) {
        let mut applied = 0_usize;
        for fact in facts {
            applied += 1;
            match fact {
                Fact::Target { name } => {
                    self.add_target(name);
                }
                Fact::Library {
                    name,
                    subtitle,
                    is_system,
                    kind,
                } => {
                    self.add_library(name, subtitle.as_deref(), *is_system, *kind);
                }
                Fact::Edge { from, to } => {
                    self.add_edge(from, to);
                }
            }
        }
        info!(
            facts = applied,
            targets = self.target_count(),
            libraries = self.library_count(),
            edges = self.edge_count(),
            "ingested facts"
        );
    }
}
