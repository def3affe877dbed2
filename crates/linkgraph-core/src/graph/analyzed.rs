//! The frozen, query-only graph produced by cycle detection.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::cycles::CycleState;
use crate::graph::filter::FilterOutcome;
use crate::graph::store::GraphStore;
use crate::model::LibraryMeta;

/// A filtered, cycle-annotated graph.
///
/// Immutable once built. Every view is a pure function of `&AnalyzedGraph`,
/// so views for different libraries can be built concurrently from shared
/// references.
#[derive(Debug, Clone)]
pub struct AnalyzedGraph {
    store: GraphStore,
    outcome: FilterOutcome,
    cycles: CycleState,
    /// library → targets with a link edge into it.
    linkers: BTreeMap<String, BTreeSet<String>>,
    /// target → libraries it links.
    links: BTreeMap<String, BTreeSet<String>>,
}

impl AnalyzedGraph {
    pub(crate) fn new(store: GraphStore, outcome: FilterOutcome, cycles: CycleState) -> Self {
        let mut linkers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut links: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (from, to) in store.edges() {
            if store.contains_target(from) && store.contains_library(to) {
                linkers.entry(to.to_string()).or_default().insert(from.to_string());
                links.entry(from.to_string()).or_default().insert(to.to_string());
            }
        }
        Self {
            store,
            outcome,
            cycles,
            linkers,
            links,
        }
    }

    /// The pruned node and edge sets.
    #[must_use]
    pub const fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub const fn cycles(&self) -> &CycleState {
        &self.cycles
    }

    #[must_use]
    pub const fn filter_outcome(&self) -> &FilterOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn library(&self, name: &str) -> Option<&LibraryMeta> {
        self.store.library(name)
    }

    /// Number of targets linking `lib`. Zero for unknown names.
    #[must_use]
    pub fn library_in_degree(&self, lib: &str) -> usize {
        self.linkers.get(lib).map_or(0, BTreeSet::len)
    }

    /// Targets linking `lib`, ascending.
    #[must_use]
    pub fn targets_linking(&self, lib: &str) -> BTreeSet<&str> {
        self.linkers
            .get(lib)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Libraries linked by at least one of `targets`, ascending.
    #[must_use]
    pub fn libraries_linked_by(&self, targets: &BTreeSet<&str>) -> BTreeSet<&str> {
        targets
            .iter()
            .filter_map(|t| self.links.get(*t))
            .flat_map(|libs| libs.iter().map(String::as_str))
            .collect()
    }

    /// Libraries with their in-degree, ascending by name.
    pub fn library_in_degrees(&self) -> impl Iterator<Item = (&str, usize)> {
        self.store
            .libraries()
            .map(|(name, _)| (name, self.library_in_degree(name)))
    }
}
