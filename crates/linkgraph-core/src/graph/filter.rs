//! Filter engine: prune the construction graph with allow predicates.
//!
//! # Allow semantics
//!
//! A name is *allowed* when no exclude rule matches it and, if any include
//! rules exist, at least one include rule matches. Exclusion always wins.
//! Libraries additionally pass through kind checks after the name rules.
//!
//! # Pruning
//!
//! 1. Package-product inference runs once ([`GraphStore::infer_package_products`]).
//! 2. Every edge is kept only if its target endpoints are allowed and, for a
//!    link edge, the library is allowed. Edges whose endpoints are not
//!    registered nodes are dropped as dangling.
//! 3. Node sets become exactly the endpoints of surviving edges, plus (when
//!    requested) every allowed target even without edges. Libraries are never
//!    kept isolated.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::graph::store::GraphStore;
use crate::model::{LibraryKind, LibraryMeta};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A named predicate over node names.
pub struct Rule {
    label: String,
    predicate: Predicate,
}

impl Rule {
    pub fn new(label: impl Into<String>, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Compile a regular expression rule. The pattern may match anywhere in
    /// the name; anchor it to require a full match.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        let re = regex::Regex::new(pattern)?;
        Ok(Self::new(pattern, move |name| re.is_match(name)))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        (self.predicate)(name)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.label).finish()
    }
}

/// Ordered include/exclude rules, evaluated exclude-then-include.
#[derive(Debug, Default)]
pub struct NameFilter {
    pub include: Vec<Rule>,
    pub exclude: Vec<Rule>,
}

impl NameFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn include(mut self, rule: Rule) -> Self {
        self.include.push(rule);
        self
    }

    #[must_use]
    pub fn exclude(mut self, rule: Rule) -> Self {
        self.exclude.push(rule);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    #[must_use]
    pub fn allows(&self, name: &str) -> bool {
        if self.exclude.iter().any(|rule| rule.matches(name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|rule| rule.matches(name))
    }
}

/// Name rules plus kind constraints for libraries.
#[derive(Debug, Default)]
pub struct LibraryFilter {
    pub names: NameFilter,
    pub include_kinds: BTreeSet<LibraryKind>,
    pub exclude_kinds: BTreeSet<LibraryKind>,
}

impl LibraryFilter {
    #[must_use]
    pub fn allows(&self, name: &str, meta: &LibraryMeta) -> bool {
        if !self.names.allows(name) {
            return false;
        }
        if !self.include_kinds.is_empty() && !self.include_kinds.contains(&meta.kind) {
            return false;
        }
        !self.exclude_kinds.contains(&meta.kind)
    }
}

/// Everything the filter stage needs.
#[derive(Debug)]
pub struct FilterSpec {
    pub targets: NameFilter,
    pub libraries: LibraryFilter,
    /// Keep allowed targets even when none of their edges survive.
    pub keep_isolated_targets: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            targets: NameFilter::default(),
            libraries: LibraryFilter::default(),
            keep_isolated_targets: true,
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredGraph
// ---------------------------------------------------------------------------

/// Counters describing what the filter stage removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOutcome {
    pub edges_kept: usize,
    pub edges_dropped_by_targets: usize,
    pub edges_dropped_by_libraries: usize,
    pub dangling_edges_dropped: usize,
    pub targets_removed: usize,
    pub libraries_removed: usize,
    pub isolated_targets_kept: usize,
    pub package_products_inferred: Vec<String>,
}

/// A pruned graph, ready for cycle detection.
#[derive(Debug, Clone)]
pub struct FilteredGraph {
    pub(crate) store: GraphStore,
    pub(crate) outcome: FilterOutcome,
}

impl FilteredGraph {
    #[must_use]
    pub const fn store(&self) -> &GraphStore {
        &self.store
    }

    #[must_use]
    pub const fn outcome(&self) -> &FilterOutcome {
        &self.outcome
    }
}

enum EdgeVerdict {
    Keep,
    Dangling,
    TargetRejected,
    LibraryRejected,
}

impl GraphStore {
    /// Prune with a [`FilterSpec`].
    #[must_use]
    pub fn filter(self, spec: &FilterSpec) -> FilteredGraph {
        self.filter_with(
            |target| spec.targets.allows(target),
            |name, meta| spec.libraries.allows(name, meta),
            spec.keep_isolated_targets,
        )
    }

    /// Prune with arbitrary predicates.
    ///
    /// Each predicate is evaluated at most once per node.
    #[must_use]
    #[instrument(skip_all, fields(keep_isolated = keep_isolated_targets))]
    pub fn filter_with<T, L>(
        mut self,
        target_allowed: T,
        library_allowed: L,
        keep_isolated_targets: bool,
    ) -> FilteredGraph
    where
        T: Fn(&str) -> bool,
        L: Fn(&str, &LibraryMeta) -> bool,
    {
        let package_products_inferred = self.infer_package_products();

        let target_ok: BTreeMap<&str, bool> = self
            .targets
            .iter()
            .map(|t| (t.as_str(), target_allowed(t)))
            .collect();
        let library_ok: BTreeMap<&str, bool> = self
            .libraries
            .iter()
            .map(|(name, meta)| (name.as_str(), library_allowed(name, meta)))
            .collect();

        let mut outcome = FilterOutcome {
            package_products_inferred,
            ..FilterOutcome::default()
        };
        let mut kept_edges: BTreeSet<(String, String)> = BTreeSet::new();

        for (from, to) in &self.edges {
            let verdict = match (target_ok.get(from.as_str()), target_ok.get(to.as_str())) {
                (None, _) => EdgeVerdict::Dangling,
                (Some(&from_ok), Some(&to_ok)) => {
                    if from_ok && to_ok {
                        EdgeVerdict::Keep
                    } else {
                        EdgeVerdict::TargetRejected
                    }
                }
                (Some(&from_ok), None) => match library_ok.get(to.as_str()) {
                    None => EdgeVerdict::Dangling,
                    Some(_) if !from_ok => EdgeVerdict::TargetRejected,
                    Some(&lib_ok) => {
                        if lib_ok {
                            EdgeVerdict::Keep
                        } else {
                            EdgeVerdict::LibraryRejected
                        }
                    }
                },
            };

            match verdict {
                EdgeVerdict::Keep => {
                    kept_edges.insert((from.clone(), to.clone()));
                }
                EdgeVerdict::Dangling => {
                    debug!(from = %from, to = %to, "dropping edge with unregistered endpoint");
                    outcome.dangling_edges_dropped += 1;
                }
                EdgeVerdict::TargetRejected => outcome.edges_dropped_by_targets += 1,
                EdgeVerdict::LibraryRejected => outcome.edges_dropped_by_libraries += 1,
            }
        }

        let mut kept_targets: BTreeSet<String> = BTreeSet::new();
        let mut kept_library_names: BTreeSet<&str> = BTreeSet::new();
        for (from, to) in &kept_edges {
            kept_targets.insert(from.clone());
            if target_ok.contains_key(to.as_str()) {
                kept_targets.insert(to.clone());
            } else {
                kept_library_names.insert(to.as_str());
            }
        }

        if keep_isolated_targets {
            for (&target, &ok) in &target_ok {
                if ok && kept_targets.insert(target.to_string()) {
                    outcome.isolated_targets_kept += 1;
                }
            }
        }

        let kept_libraries: BTreeMap<String, LibraryMeta> = self
            .libraries
            .iter()
            .filter(|(name, _)| kept_library_names.contains(name.as_str()))
            .map(|(name, meta)| (name.clone(), meta.clone()))
            .collect();

        outcome.edges_kept = kept_edges.len();
        outcome.targets_removed = self.targets.len() - kept_targets.len();
        outcome.libraries_removed = self.libraries.len() - kept_libraries.len();

        info!(
            edges_kept = outcome.edges_kept,
            dropped_by_targets = outcome.edges_dropped_by_targets,
            dropped_by_libraries = outcome.edges_dropped_by_libraries,
            dangling = outcome.dangling_edges_dropped,
            targets_removed = outcome.targets_removed,
            libraries_removed = outcome.libraries_removed,
            "filter stage complete"
        );

        FilteredGraph {
            store: GraphStore {
                targets: kept_targets,
                libraries: kept_libraries,
                edges: kept_edges,
            },
            outcome,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
