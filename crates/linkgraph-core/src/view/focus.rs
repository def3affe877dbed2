//! Per-library focused views.
//!
//! A focused view of library `L` contains `L`, every target linking it, and
//! the `target → L` edges. Two options widen it:
//!
//! - `include_target_edges`: target → target edges between those targets.
//! - `include_peer_libraries`: the other libraries those targets link, plus
//!   the target → peer edges.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::graph::AnalyzedGraph;
use crate::view::{EdgeEntry, EdgeRole, LibraryEntry, TargetEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusOptions {
    pub include_target_edges: bool,
    pub include_peer_libraries: bool,
}

/// Subgraph centred on one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusedView {
    pub library: LibraryEntry,
    pub targets: Vec<TargetEntry>,
    pub peers: Vec<LibraryEntry>,
    /// Ascending by `(from, to)`; `role` tells the edge groups apart.
    pub edges: Vec<EdgeEntry>,
}

impl AnalyzedGraph {
    /// Build the focused view of `library`, or `None` if it is not a library
    /// of this graph.
    #[must_use]
    pub fn focused_view(&self, library: &str, options: &FocusOptions) -> Option<FocusedView> {
        let focus = self.library_entry(library)?;
        let targets = self.targets_linking(library);

        let mut peers: BTreeSet<&str> = BTreeSet::new();
        if options.include_peer_libraries {
            peers = self.libraries_linked_by(&targets);
            peers.remove(library);
        }

        let mut edges: Vec<EdgeEntry> = targets
            .iter()
            .map(|t| self.edge_entry(t, library, EdgeRole::Link))
            .collect();

        if options.include_target_edges {
            edges.extend(
                self.store()
                    .edges()
                    .filter(|(a, b)| targets.contains(a) && targets.contains(b))
                    .map(|(a, b)| self.edge_entry(a, b, EdgeRole::TargetDependency)),
            );
        }

        if !peers.is_empty() {
            edges.extend(
                self.store()
                    .edges()
                    .filter(|(a, b)| targets.contains(a) && peers.contains(b))
                    .map(|(a, b)| self.edge_entry(a, b, EdgeRole::PeerLink)),
            );
        }

        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        Some(FocusedView {
            library: focus,
            targets: targets.iter().map(|t| self.target_entry(t)).collect(),
            peers: peers.iter().filter_map(|p| self.library_entry(p)).collect(),
            edges,
        })
    }
}
