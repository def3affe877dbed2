//! Cycle detection over the filtered dependency graph.
//!
//! # Algorithm
//!
//! Tarjan's strongly-connected-components algorithm, run iteratively with an
//! explicit frame stack so deep dependency chains cannot overflow the call
//! stack. Every node (target or library, including isolated ones) is a
//! vertex.
//!
//! A component is a **cycle** when it has more than one member or when its
//! single member has a self-loop. Cycle members are sorted, the component
//! list is sorted, and cycle edges are the surviving edges whose endpoints
//! share a cycle component.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::graph::analyzed::AnalyzedGraph;
use crate::graph::filter::FilteredGraph;
use crate::graph::store::GraphStore;

// ---------------------------------------------------------------------------
// CycleState
// ---------------------------------------------------------------------------

/// One cycle: a strongly connected component of size > 1, or a self-loop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CycleComponent {
    /// Member names, ascending.
    pub members: Vec<String>,
}

impl CycleComponent {
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.members.len() == 1
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.binary_search_by(|m| m.as_str().cmp(name)).is_ok()
    }
}

/// Cycle annotation for an analyzed graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleState {
    components: Vec<CycleComponent>,
    membership: HashMap<String, usize>,
    edges: BTreeSet<(String, String)>,
    scc_count: usize,
}

impl CycleState {
    /// Cycle components, sorted by their member lists.
    #[must_use]
    pub fn components(&self) -> &[CycleComponent] {
        &self.components
    }

    #[must_use]
    pub fn has_cycles(&self) -> bool {
        !self.components.is_empty()
    }

    #[must_use]
    pub fn cycle_count(&self) -> usize {
        self.components.len()
    }

    /// Total strongly connected components, cyclic or not.
    #[must_use]
    pub const fn scc_count(&self) -> usize {
        self.scc_count
    }

    /// Index into [`CycleState::components`] of the cycle containing `name`.
    #[must_use]
    pub fn component_of(&self, name: &str) -> Option<usize> {
        self.membership.get(name).copied()
    }

    #[must_use]
    pub fn is_cycle_node(&self, name: &str) -> bool {
        self.membership.contains_key(name)
    }

    #[must_use]
    pub fn is_cycle_edge(&self, from: &str, to: &str) -> bool {
        match (self.membership.get(from), self.membership.get(to)) {
            (Some(a), Some(b)) if a == b => self.edges.contains(&(from.to_string(), to.to_string())),
            _ => false,
        }
    }

    /// All nodes in any cycle, ascending.
    #[must_use]
    pub fn cycle_nodes(&self) -> BTreeSet<&str> {
        self.membership.keys().map(String::as_str).collect()
    }

    /// All cycle edges in ascending `(from, to)` order.
    pub fn cycle_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    #[must_use]
    pub fn cycle_edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Cycle edges internal to one component, ascending.
    #[must_use]
    pub fn internal_edges(&self, component: usize) -> Vec<(&str, &str)> {
        self.cycle_edges()
            .filter(|(from, _)| self.membership.get(*from) == Some(&component))
            .collect()
    }

    /// Compute cycle state for the nodes and edges of `store`.
    #[must_use]
    pub fn compute(store: &GraphStore) -> Self {
        let (graph, _) = to_petgraph(store);
        let sccs = tarjan_components(&graph);
        let scc_count = sccs.len();

        let mut components: Vec<CycleComponent> = sccs
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| graph.find_edge(node, node).is_some())
            })
            .map(|component| {
                let mut members: Vec<String> =
                    component.into_iter().map(|idx| graph[idx].clone()).collect();
                members.sort_unstable();
                CycleComponent { members }
            })
            .collect();
        components.sort_unstable();

        let membership: HashMap<String, usize> = components
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.members.iter().map(move |m| (m.clone(), i)))
            .collect();

        let edges: BTreeSet<(String, String)> = store
            .edges
            .iter()
            .filter(|(a, b)| {
                matches!(
                    (membership.get(a), membership.get(b)),
                    (Some(x), Some(y)) if x == y
                )
            })
            .cloned()
            .collect();

        Self {
            components,
            membership,
            edges,
            scc_count,
        }
    }
}

impl FilteredGraph {
    /// Run cycle detection and freeze the graph for queries.
    ///
    /// Consumes the filtered graph, so cycle state can never outlive the edge
    /// set it was computed from.
    #[must_use]
    #[instrument(skip_all, fields(nodes = self.store.node_count(), edges = self.store.edge_count()))]
    pub fn detect_cycles(self) -> AnalyzedGraph {
        let cycles = CycleState::compute(&self.store);

        if cycles.has_cycles() {
            warn!(
                cycles = cycles.cycle_count(),
                cycle_nodes = cycles.membership.len(),
                cycle_edges = cycles.cycle_edge_count(),
                "dependency cycles detected"
            );
        } else {
            info!(sccs = cycles.scc_count(), "no dependency cycles");
        }

        AnalyzedGraph::new(self.store, self.outcome, cycles)
    }
}

// ---------------------------------------------------------------------------
// petgraph adjacency
// ---------------------------------------------------------------------------

/// Build a petgraph view of the store: every node, every edge whose
/// endpoints are both registered.
///
/// Node indices follow ascending name order.
#[must_use]
pub fn to_petgraph(store: &GraphStore) -> (DiGraph<String, ()>, HashMap<String, NodeIndex>) {
    let names: BTreeSet<&str> = store
        .targets()
        .chain(store.libraries().map(|(name, _)| name))
        .collect();

    let mut graph = DiGraph::<String, ()>::with_capacity(names.len(), store.edge_count());
    let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(names.len());
    for name in names {
        let idx = graph.add_node(name.to_string());
        node_map.insert(name.to_string(), idx);
    }

    for (from, to) in store.edges() {
        if let (Some(&a), Some(&b)) = (node_map.get(from), node_map.get(to)) {
            graph.add_edge(a, b, ());
        }
    }

    (graph, node_map)
}

// ---------------------------------------------------------------------------
// Iterative Tarjan
// ---------------------------------------------------------------------------

const UNVISITED: usize = usize::MAX;

struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

struct Tarjan<'g, N, E> {
    graph: &'g DiGraph<N, E>,
    index: Vec<usize>,
    low_link: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<NodeIndex>,
    frames: Vec<Frame>,
    next_index: usize,
    components: Vec<Vec<NodeIndex>>,
}

impl<'g, N, E> Tarjan<'g, N, E> {
    fn new(graph: &'g DiGraph<N, E>) -> Self {
        let n = graph.node_count();
        Self {
            graph,
            index: vec![UNVISITED; n],
            low_link: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            frames: Vec::new(),
            next_index: 0,
            components: Vec::new(),
        }
    }

    fn enter(&mut self, v: NodeIndex) {
        let i = v.index();
        self.index[i] = self.next_index;
        self.low_link[i] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[i] = true;
        self.frames.push(Frame {
            node: v,
            successors: self.graph.neighbors_directed(v, Direction::Outgoing).collect(),
            cursor: 0,
        });
    }

    fn run(mut self) -> Vec<Vec<NodeIndex>> {
        for root in self.graph.node_indices() {
            if self.index[root.index()] != UNVISITED {
                continue;
            }
            self.enter(root);

            while let Some(frame) = self.frames.last_mut() {
                let v = frame.node;
                if let Some(&w) = frame.successors.get(frame.cursor) {
                    frame.cursor += 1;
                    if self.index[w.index()] == UNVISITED {
                        self.enter(w);
                    } else if self.on_stack[w.index()] {
                        self.low_link[v.index()] = self.low_link[v.index()].min(self.index[w.index()]);
                    }
                    continue;
                }

                // All successors done: close v.
                self.frames.pop();
                if self.low_link[v.index()] == self.index[v.index()] {
                    let mut component = Vec::new();
                    while let Some(w) = self.stack.pop() {
                        self.on_stack[w.index()] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    self.components.push(component);
                }
                if let Some(parent) = self.frames.last() {
                    let p = parent.node.index();
                    self.low_link[p] = self.low_link[p].min(self.low_link[v.index()]);
                }
            }
        }
        self.components
    }
}

/// Strongly connected components of `graph`, in Tarjan's completion order
/// (reverse topological order of the condensation).
///
/// Uses an explicit stack; safe on arbitrarily deep graphs.
#[must_use]
pub fn tarjan_components<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    Tarjan::new(graph).run()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LibraryKind;

    fn targets_with_edges(nodes: &[&str], edges: &[(&str, &str)]) -> GraphStore {
        let mut g = GraphStore::new();
        for node in nodes {
            g.add_target(node);
        }
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    fn members(state: &CycleState) -> Vec<Vec<&str>> {
        state
            .components()
            .iter()
            .map(|c| c.members.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn acyclic_chain_has_no_cycles() {
        let g = targets_with_edges(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let state = CycleState::compute(&g);
        assert!(!state.has_cycles());
        assert_eq!(state.scc_count(), 3);
    }

    #[test]
    fn two_node_cycle() {
        let g = targets_with_edges(&["X", "Y"], &[("X", "Y"), ("Y", "X")]);
        let state = CycleState::compute(&g);
        assert_eq!(members(&state), vec![vec!["X", "Y"]]);
        assert!(state.is_cycle_edge("X", "Y"));
        assert!(state.is_cycle_edge("Y", "X"));
        assert_eq!(state.cycle_edge_count(), 2);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = targets_with_edges(&["Z"], &[("Z", "Z")]);
        let state = CycleState::compute(&g);
        assert_eq!(members(&state), vec![vec!["Z"]]);
        assert!(state.components()[0].is_self_loop());
        assert!(state.is_cycle_edge("Z", "Z"));
    }

    #[test]
    fn reports_sccs_and_self_loops_sorted() {
        // SCC1: A <-> B, SCC2: C -> D -> E -> C, SCC3: F -> F, G alone.
        let g = targets_with_edges(
            &["A", "B", "C", "D", "E", "F", "G"],
            &[
                ("A", "B"),
                ("B", "A"),
                ("C", "D"),
                ("D", "E"),
                ("E", "C"),
                ("F", "F"),
                ("E", "G"),
            ],
        );
        let state = CycleState::compute(&g);
        assert_eq!(
            members(&state),
            vec![vec!["A", "B"], vec!["C", "D", "E"], vec!["F"]]
        );
        assert!(!state.is_cycle_node("G"));
        assert!(!state.is_cycle_edge("E", "G"));
        assert_eq!(state.component_of("D"), Some(1));
        assert_eq!(state.internal_edges(1), vec![("C", "D"), ("D", "E"), ("E", "C")]);
    }

    #[test]
    fn edge_between_two_cycles_is_not_a_cycle_edge() {
        let g = targets_with_edges(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("B", "C"), ("C", "D"), ("D", "C")],
        );
        let state = CycleState::compute(&g);
        assert_eq!(state.cycle_count(), 2);
        assert!(!state.is_cycle_edge("B", "C"));
    }

    #[test]
    fn libraries_are_vertices_too() {
        let mut g = GraphStore::new();
        g.add_target("App");
        g.add_library("Kit", None, false, LibraryKind::Framework);
        g.add_library("Orphan", None, false, LibraryKind::Framework);
        g.add_edge("App", "Kit");
        let state = CycleState::compute(&g);
        assert_eq!(state.scc_count(), 3);
        assert!(!state.has_cycles());
    }

    #[test]
    fn empty_graph_has_no_components() {
        let state = CycleState::compute(&GraphStore::new());
        assert_eq!(state.scc_count(), 0);
        assert!(!state.has_cycles());
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut g = GraphStore::new();
        let names: Vec<String> = (0..200_000).map(|i| format!("t{i:06}")).collect();
        for name in &names {
            g.add_target(name);
        }
        for pair in names.windows(2) {
            g.add_edge(&pair[0], &pair[1]);
        }
        // Close the ring so the whole chain is one component.
        g.add_edge(&names[names.len() - 1], &names[0]);

        let state = CycleState::compute(&g);
        assert_eq!(state.cycle_count(), 1);
        assert_eq!(state.components()[0].members.len(), names.len());
    }

    #[test]
    fn matches_petgraph_tarjan_partition() {
        let g = targets_with_edges(
            &["a", "b", "c", "d", "e", "f"],
            &[
                ("a", "b"),
                ("b", "c"),
                ("c", "a"),
                ("c", "d"),
                ("d", "e"),
                ("e", "d"),
                ("f", "f"),
            ],
        );
        let (graph, _) = to_petgraph(&g);
        let normalize = |sccs: Vec<Vec<NodeIndex>>| {
            let mut out: Vec<Vec<usize>> = sccs
                .into_iter()
                .map(|c| {
                    let mut v: Vec<usize> = c.into_iter().map(NodeIndex::index).collect();
                    v.sort_unstable();
                    v
                })
                .collect();
            out.sort_unstable();
            out
        };
        assert_eq!(
            normalize(tarjan_components(&graph)),
            normalize(petgraph::algo::tarjan_scc(&graph))
        );
    }
}
