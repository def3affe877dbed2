//! Filter configuration: raw, user-facing filter settings and their
//! compilation into a [`FilterSpec`].
//!
//! A config holds plain strings (regex patterns and kind tags) so it can be
//! deserialized from TOML, assembled from command-line flags, merged, and
//! echoed back in reports. [`FilterConfig::compile`] turns it into
//! predicates; entries that do not compile are reported and skipped rather
//! than failing the run.
//!
//! ```toml
//! include_targets = ["^App"]
//! exclude_libraries = [".*Test.*"]
//! exclude_kinds = [".tbd"]
//! keep_isolated_targets = false
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FilterError;
use crate::graph::filter::{FilterSpec, LibraryFilter, NameFilter, Rule};
use crate::model::LibraryKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub include_targets: Vec<String>,
    #[serde(default)]
    pub exclude_targets: Vec<String>,
    #[serde(default)]
    pub include_libraries: Vec<String>,
    #[serde(default)]
    pub exclude_libraries: Vec<String>,
    #[serde(default)]
    pub include_kinds: Vec<String>,
    #[serde(default)]
    pub exclude_kinds: Vec<String>,
    #[serde(default = "default_true")]
    pub keep_isolated_targets: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_targets: Vec::new(),
            exclude_targets: Vec::new(),
            include_libraries: Vec::new(),
            exclude_libraries: Vec::new(),
            include_kinds: Vec::new(),
            exclude_kinds: Vec::new(),
            keep_isolated_targets: default_true(),
        }
    }
}

/// The result of [`FilterConfig::compile`].
#[derive(Debug)]
pub struct CompiledFilters {
    pub spec: FilterSpec,
    /// Entries that were skipped, in config order.
    pub rejected: Vec<FilterError>,
}

impl FilterConfig {
    /// Parse a standalone filter config.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Config`] when the text is not valid TOML or
    /// contains unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, FilterError> {
        toml::from_str(text).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Append `other`'s lists to this config. `keep_isolated_targets` is
    /// cleared if either side clears it.
    pub fn merge(&mut self, other: Self) {
        self.include_targets.extend(other.include_targets);
        self.exclude_targets.extend(other.exclude_targets);
        self.include_libraries.extend(other.include_libraries);
        self.exclude_libraries.extend(other.exclude_libraries);
        self.include_kinds.extend(other.include_kinds);
        self.exclude_kinds.extend(other.exclude_kinds);
        self.keep_isolated_targets &= other.keep_isolated_targets;
    }

    /// Compile into a [`FilterSpec`], skipping (and logging) every invalid
    /// pattern or unknown kind tag.
    #[must_use]
    pub fn compile(&self) -> CompiledFilters {
        let mut rejected = Vec::new();

        let targets = NameFilter {
            include: compile_rules("include_targets", &self.include_targets, &mut rejected),
            exclude: compile_rules("exclude_targets", &self.exclude_targets, &mut rejected),
        };
        let libraries = LibraryFilter {
            names: NameFilter {
                include: compile_rules("include_libraries", &self.include_libraries, &mut rejected),
                exclude: compile_rules("exclude_libraries", &self.exclude_libraries, &mut rejected),
            },
            include_kinds: compile_kinds("include_kinds", &self.include_kinds, &mut rejected),
            exclude_kinds: compile_kinds("exclude_kinds", &self.exclude_kinds, &mut rejected),
        };

        for err in &rejected {
            warn!(code = %err.code(), "skipping filter entry: {err}");
        }

        CompiledFilters {
            spec: FilterSpec {
                targets,
                libraries,
                keep_isolated_targets: self.keep_isolated_targets,
            },
            rejected,
        }
    }

    /// Kind tags normalized to canonical tokens; unknown tags are dropped.
    ///
    /// Used when echoing the effective configuration.
    #[must_use]
    pub fn normalized_kinds(tags: &[String]) -> Vec<&'static str> {
        tags.iter()
            .filter_map(|t| LibraryKind::from_tag(t))
            .map(LibraryKind::token)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn compile_rules(field: &'static str, patterns: &[String], rejected: &mut Vec<FilterError>) -> Vec<Rule> {
    patterns
        .iter()
        .filter_map(|pattern| match Rule::regex(pattern) {
            Ok(rule) => Some(rule),
            Err(e) => {
                rejected.push(FilterError::InvalidPattern {
                    field,
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
                None
            }
        })
        .collect()
}

fn compile_kinds(
    field: &'static str,
    tags: &[String],
    rejected: &mut Vec<FilterError>,
) -> BTreeSet<LibraryKind> {
    tags.iter()
        .filter_map(|tag| {
            LibraryKind::from_tag(tag).or_else(|| {
                rejected.push(FilterError::UnknownKindTag {
                    field,
                    tag: tag.clone(),
                });
                None
            })
        })
        .collect()
}

const fn default_true() -> bool {
    true
}
