//! Dependency graph pipeline.
//!
//! # Overview
//!
//! Targets and the libraries they link form a directed graph. The graph moves
//! through three phases, each its own type, and every transition consumes the
//! previous phase by value:
//!
//! ## Pipeline
//!
//! ```text
//! add_target / add_library / add_edge
//!        ↓
//! GraphStore        (construction; metadata merges on insert)
//!        ↓  GraphStore::filter(&FilterSpec)
//!        ↓    └─ infer_package_products() runs first
//! FilteredGraph     (pruned; no dangling edges)
//!        ↓  FilteredGraph::detect_cycles()
//! AnalyzedGraph     (frozen; cycle state + views; Send + Sync)
//!        ↓  stats::GraphStats::from_analyzed()
//! GraphStats
//! ```
//!
//! Cycle state exists only on [`AnalyzedGraph`], so it can never describe an
//! edge set other than the one it was computed from.
//!
//! ## Typical Usage
//!
//! ```rust
//! use linkgraph_core::graph::{FilterSpec, GraphStore};
//! use linkgraph_core::model::LibraryKind;
//!
//! let mut store = GraphStore::new();
//! store.add_target("App");
//! store.add_library("Kit", None, false, LibraryKind::Framework);
//! store.add_edge("App", "Kit");
//!
//! let analyzed = store.filter(&FilterSpec::default()).detect_cycles();
//! assert_eq!(analyzed.library_in_degree("Kit"), 1);
//! assert!(!analyzed.cycles().has_cycles());
//! ```

pub mod analyzed;
pub mod cycles;
pub mod filter;
pub mod infer;
pub mod stats;
pub mod store;

pub use analyzed::AnalyzedGraph;
pub use cycles::{CycleComponent, CycleState, tarjan_components};
pub use filter::{FilterOutcome, FilterSpec, FilteredGraph, LibraryFilter, NameFilter, Rule};
pub use stats::GraphStats;
pub use store::GraphStore;
