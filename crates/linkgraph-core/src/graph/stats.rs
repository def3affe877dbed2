//! Summary statistics for an analyzed dependency graph.
//!
//! # Statistics Provided
//!
//! - **target_count / library_count / edge_count**: sizes after filtering.
//! - **target_edge_count / link_edge_count**: target→target edges versus
//!   target→library edges.
//! - **system_library_count / third_party_library_count**: split on the
//!   accumulated `is_system` flag.
//! - **isolated_node_count**: nodes with neither in- nor out-edges. Only
//!   targets can be isolated, since the filter never keeps bare libraries.
//! - **max_library_in_degree**: the most-linked library's in-degree.
//! - **density**: `edge_count / (node_count * (node_count - 1))`; zero for
//!   graphs with fewer than two nodes.
//! - **scc_count / cycle_count / cycle_node_count / cycle_edge_count**: from
//!   the cycle detector.

use petgraph::Direction;
use petgraph::algo::connected_components;
use serde::Serialize;

use crate::graph::analyzed::AnalyzedGraph;
use crate::graph::cycles::to_petgraph;

/// Summary statistics for an [`AnalyzedGraph`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub target_count: usize,
    pub library_count: usize,
    pub edge_count: usize,
    pub target_edge_count: usize,
    pub link_edge_count: usize,
    pub system_library_count: usize,
    pub third_party_library_count: usize,
    pub isolated_node_count: usize,
    /// Number of weakly connected components (disjoint subgraphs).
    pub weakly_connected_component_count: usize,
    pub max_library_in_degree: usize,
    pub density: f64,
    pub scc_count: usize,
    pub cycle_count: usize,
    pub cycle_node_count: usize,
    pub cycle_edge_count: usize,
}

impl GraphStats {
    #[must_use]
    pub fn from_analyzed(graph: &AnalyzedGraph) -> Self {
        let store = graph.store();
        let cycles = graph.cycles();
        let (pg, _) = to_petgraph(store);

        let link_edge_count = store
            .edges()
            .filter(|(_, to)| store.contains_library(to))
            .count();
        let system_library_count = store.libraries().filter(|(_, meta)| meta.is_system).count();

        let isolated_node_count = pg
            .node_indices()
            .filter(|&idx| {
                pg.neighbors_directed(idx, Direction::Incoming).next().is_none()
                    && pg.neighbors_directed(idx, Direction::Outgoing).next().is_none()
            })
            .count();

        let max_library_in_degree = graph
            .library_in_degrees()
            .map(|(_, degree)| degree)
            .max()
            .unwrap_or(0);

        Self {
            target_count: store.target_count(),
            library_count: store.library_count(),
            edge_count: store.edge_count(),
            target_edge_count: store.edge_count() - link_edge_count,
            link_edge_count,
            system_library_count,
            third_party_library_count: store.library_count() - system_library_count,
            isolated_node_count,
            weakly_connected_component_count: connected_components(&pg),
            max_library_in_degree,
            density: compute_density(store.node_count(), store.edge_count()),
            scc_count: cycles.scc_count(),
            cycle_count: cycles.cycle_count(),
            cycle_node_count: cycles.cycle_nodes().len(),
            cycle_edge_count: cycles.cycle_edge_count(),
        }
    }

    #[must_use]
    pub const fn has_cycles(&self) -> bool {
        self.cycle_count > 0
    }

    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.target_count + self.library_count
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}
