#![forbid(unsafe_code)]
//! linkgraph-core library.
//!
//! Dependency graph engine for build targets and the libraries they link.
//! See [`graph`] for the build → filter → detect pipeline and [`view`] for
//! the read-only projections handed to exporters.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums carrying an [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod facts;
pub mod graph;
pub mod model;
pub mod view;

pub use config::{CompiledFilters, FilterConfig};
pub use error::{ErrorCode, FactError, FilterError};
pub use facts::{Fact, FactFile};
pub use graph::{AnalyzedGraph, FilteredGraph, GraphStore};
pub use model::{LibraryKind, LibraryMeta, NodeKind};
