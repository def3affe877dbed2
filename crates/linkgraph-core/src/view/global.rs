//! Whole-graph view.

use serde::Serialize;

use crate::graph::{AnalyzedGraph, CycleComponent};
use crate::view::{EdgeEntry, EdgeRole, LibraryEntry, TargetEntry};

/// Every node and edge of an analyzed graph, sorted, with cycle flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalView {
    pub targets: Vec<TargetEntry>,
    pub libraries: Vec<LibraryEntry>,
    pub edges: Vec<EdgeEntry>,
    pub cycles: Vec<CycleComponent>,
    /// Cycle edges as `(from, to)`, ascending.
    pub cycle_edges: Vec<(String, String)>,
}

impl GlobalView {
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

impl AnalyzedGraph {
    #[must_use]
    pub fn global_view(&self) -> GlobalView {
        let store = self.store();
        let cycles = self.cycles();

        GlobalView {
            targets: store.targets().map(|t| self.target_entry(t)).collect(),
            libraries: store
                .libraries()
                .filter_map(|(name, _)| self.library_entry(name))
                .collect(),
            edges: store
                .edges()
                .map(|(from, to)| {
                    let role = if store.contains_target(to) {
                        EdgeRole::TargetDependency
                    } else {
                        EdgeRole::Link
                    };
                    self.edge_entry(from, to, role)
                })
                .collect(),
            cycles: cycles.components().to_vec(),
            cycle_edges: cycles
                .cycle_edges()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        }
    }
}
