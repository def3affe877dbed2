//! Read-only views over an [`AnalyzedGraph`](crate::graph::AnalyzedGraph).
//!
//! Views are plain serde-serializable structs with owned data. Every node
//! and edge carries an `in_cycle` flag taken from the graph's cycle state;
//! views never recompute cycles.
//!
//! - [`global::GlobalView`]: the whole graph.
//! - [`focus::FocusedView`]: one library, the targets linking it, and
//!   optionally their target dependencies and peer libraries.
//! - [`select::FocusSelection`]: which libraries get a focused view.
//! - [`summary::CycleSummary`]: status lines for CI.

use serde::Serialize;

use crate::graph::AnalyzedGraph;
use crate::model::LibraryKind;

pub mod focus;
pub mod global;
pub mod select;
pub mod summary;

pub use focus::{FocusOptions, FocusedView};
pub use global::GlobalView;
pub use select::FocusSelection;
pub use summary::CycleSummary;

/// A target node in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    pub name: String,
    pub in_cycle: bool,
}

/// A library node in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    pub name: String,
    pub is_system: bool,
    pub kind: LibraryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub in_degree: usize,
    pub in_cycle: bool,
}

/// What an edge connects, from the point of view of the rendering view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    /// target → target
    TargetDependency,
    /// target → library (the focus library, in a focused view)
    Link,
    /// target → another library linked by the focus library's targets
    PeerLink,
}

/// A directed edge in a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeEntry {
    pub from: String,
    pub to: String,
    pub role: EdgeRole,
    pub in_cycle: bool,
}

impl AnalyzedGraph {
    pub(crate) fn target_entry(&self, name: &str) -> TargetEntry {
        TargetEntry {
            name: name.to_string(),
            in_cycle: self.cycles().is_cycle_node(name),
        }
    }

    /// `None` if `name` is not a library of this graph.
    pub(crate) fn library_entry(&self, name: &str) -> Option<LibraryEntry> {
        let meta = self.library(name)?;
        Some(LibraryEntry {
            name: name.to_string(),
            is_system: meta.is_system,
            kind: meta.kind,
            subtitle: meta.subtitle.clone(),
            in_degree: self.library_in_degree(name),
            in_cycle: self.cycles().is_cycle_node(name),
        })
    }

    pub(crate) fn edge_entry(&self, from: &str, to: &str, role: EdgeRole) -> EdgeEntry {
        EdgeEntry {
            from: from.to_string(),
            to: to.to_string(),
            role,
            in_cycle: self.cycles().is_cycle_edge(from, to),
        }
    }
}
