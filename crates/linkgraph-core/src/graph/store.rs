//! Graph store: the construction-phase dependency graph.
//!
//! # Overview
//!
//! [`GraphStore`] owns every fact the ingestion side reports: target names,
//! library names with their accumulated [`LibraryMeta`], and the directed
//! edge set. Everything is kept in ordered collections so iteration, exports
//! and the content hash are deterministic regardless of insertion order.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "target A depends on B", where B is either another
//! target (target dependency) or a library (link).
//!
//! ## Malformed facts
//!
//! Registration never fails. An edge with an empty endpoint is dropped
//! silently; a name registered in both namespaces keeps its first namespace
//! and the conflicting registration is logged and ignored. Edges pointing at
//! names that were never registered are kept here and removed by the filter
//! stage, which is the only place nodes and edges are reconciled.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use tracing::{trace, warn};

use crate::model::{LibraryKind, LibraryMeta, NodeKind};

// ---------------------------------------------------------------------------
// GraphStore
// ---------------------------------------------------------------------------

/// A dependency graph under construction.
///
/// Call [`GraphStore::filter`] (or [`GraphStore::filter_with`]) to move on to
/// the pruning phase; cycle detection is only available after that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStore {
    pub(crate) targets: BTreeSet<String>,
    pub(crate) libraries: BTreeMap<String, LibraryMeta>,
    pub(crate) edges: BTreeSet<(String, String)>,
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target. Returns `true` if the name is newly added.
    pub fn add_target(&mut self, name: &str) -> bool {
        if name.is_empty() {
            trace!("ignoring target with empty name");
            return false;
        }
        if self.libraries.contains_key(name) {
            warn!(name, "target name already registered as a library; ignoring");
            return false;
        }
        self.targets.insert(name.to_string())
    }

    /// Register a library, folding metadata into any earlier registration.
    ///
    /// Returns `false` only when the registration was ignored.
    pub fn add_library(
        &mut self,
        name: &str,
        subtitle: Option<&str>,
        is_system: bool,
        kind: LibraryKind,
    ) -> bool {
        if name.is_empty() {
            trace!("ignoring library with empty name");
            return false;
        }
        if self.targets.contains(name) {
            warn!(name, "library name already registered as a target; ignoring");
            return false;
        }

        let meta = self.libraries.entry(name.to_string()).or_default();
        let previous = meta.kind;
        if meta.merge(is_system, kind, subtitle) {
            warn!(
                name,
                previous = %previous,
                reported = %kind,
                kept = %meta.kind,
                "conflicting library kinds"
            );
        }
        true
    }

    /// Record `from → to`. Empty endpoints are silently ignored.
    ///
    /// Returns `true` if the edge is new.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if from.is_empty() || to.is_empty() {
            return false;
        }
        self.edges.insert((from.to_string(), to.to_string()))
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// Which namespace `name` belongs to, if any.
    #[must_use]
    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        if self.targets.contains(name) {
            Some(NodeKind::Target)
        } else if self.libraries.contains_key(name) {
            Some(NodeKind::Library)
        } else {
            None
        }
    }

    #[must_use]
    pub fn contains_target(&self, name: &str) -> bool {
        self.targets.contains(name)
    }

    #[must_use]
    pub fn contains_library(&self, name: &str) -> bool {
        self.libraries.contains_key(name)
    }

    #[must_use]
    pub fn library(&self, name: &str) -> Option<&LibraryMeta> {
        self.libraries.get(name)
    }

    /// Target names in ascending order.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(String::as_str)
    }

    /// Libraries in ascending name order.
    pub fn libraries(&self) -> impl Iterator<Item = (&str, &LibraryMeta)> {
        self.libraries.iter().map(|(name, meta)| (name.as_str(), meta))
    }

    /// Edges in ascending `(from, to)` order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.targets.len() + self.libraries.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Number of targets with an edge into `lib`.
    #[must_use]
    pub fn library_in_degree(&self, lib: &str) -> usize {
        self.edges
            .iter()
            .filter(|(a, b)| b == lib && self.targets.contains(a))
            .count()
    }

    /// Targets with an edge into `lib`.
    #[must_use]
    pub fn targets_linking(&self, lib: &str) -> BTreeSet<&str> {
        self.edges
            .iter()
            .filter(|(a, b)| b == lib && self.targets.contains(a))
            .map(|(a, _)| a.as_str())
            .collect()
    }

    /// Libraries one edge away from any target in `targets`.
    #[must_use]
    pub fn libraries_linked_by(&self, targets: &BTreeSet<&str>) -> BTreeSet<&str> {
        self.edges
            .iter()
            .filter(|(a, b)| targets.contains(a.as_str()) && self.libraries.contains_key(b))
            .map(|(_, b)| b.as_str())
            .collect()
    }

    /// BLAKE3 hash of the node and edge sets, including library metadata.
    ///
    /// Two stores built from the same facts (in any order) hash equal.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for target in &self.targets {
            hasher.update(b"T\x00");
            hasher.update(target.as_bytes());
            hasher.update(b"\x00");
        }
        for (name, meta) in &self.libraries {
            hasher.update(b"L\x00");
            hasher.update(name.as_bytes());
            hasher.update(b"\x00");
            hasher.update(meta.kind.token().as_bytes());
            hasher.update(if meta.is_system { b"\x001" } else { b"\x000" });
            hasher.update(b"\x00");
            hasher.update(meta.subtitle.as_deref().unwrap_or_default().as_bytes());
            hasher.update(b"\x00");
        }
        for (from, to) in &self.edges {
            hasher.update(b"E\x00");
            hasher.update(from.as_bytes());
            hasher.update(b"\x00");
            hasher.update(to.as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
