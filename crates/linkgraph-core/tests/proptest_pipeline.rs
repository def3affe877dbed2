use std::collections::HashSet;

use proptest::prelude::*;

use linkgraph_core::graph::filter::{LibraryFilter, NameFilter, Rule};
use linkgraph_core::graph::{FilterSpec, GraphStore};
use linkgraph_core::{Fact, LibraryKind};

const NODE_COUNT: usize = 20;

fn target_name(i: usize) -> String {
    format!("t{i:02}")
}

fn lib_name(i: usize) -> String {
    format!("L{i:02}")
}

fn arb_kind() -> impl Strategy<Value = LibraryKind> {
    prop::sample::select(LibraryKind::ALL.to_vec())
}

/// Facts over a small fixed name pool, so duplicates and dangling edges are
/// common. Target and library names never collide.
fn arb_fact() -> impl Strategy<Value = Fact> {
    prop_oneof![
        (0..NODE_COUNT).prop_map(|i| Fact::Target { name: target_name(i) }),
        (
            0..8_usize,
            any::<bool>(),
            arb_kind(),
            prop::option::of(prop::sample::select(vec![
                "https://example.com/a",
                "https://example.com/b",
                "Local Package",
            ])),
        )
            .prop_map(|(i, is_system, kind, subtitle)| Fact::Library {
                name: lib_name(i),
                subtitle: subtitle.map(str::to_string),
                is_system,
                kind,
            }),
        (0..NODE_COUNT, 0..NODE_COUNT).prop_map(|(a, b)| Fact::Edge {
            from: target_name(a),
            to: target_name(b),
        }),
        (0..NODE_COUNT, 0..8_usize).prop_map(|(a, b)| Fact::Edge {
            from: target_name(a),
            to: lib_name(b),
        }),
    ]
}

fn arb_facts() -> impl Strategy<Value = Vec<Fact>> {
    prop::collection::vec(arb_fact(), 0..80)
}

/// Every node reachable from `start` (including itself via any path of
/// length >= 0).
fn reachable(store: &GraphStore, start: &str) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut stack = vec![start.to_string()];
    while let Some(node) = stack.pop() {
        if !seen.insert(node.clone()) {
            continue;
        }
        for (from, to) in store.edges() {
            if from == node {
                stack.push(to.to_string());
            }
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn registering_twice_changes_nothing(facts in arb_facts()) {
        let once = GraphStore::from_facts(&facts);
        let mut twice = once.clone();
        twice.ingest(&facts);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.content_hash(), twice.content_hash());
    }

    #[test]
    fn insertion_order_is_irrelevant(
        (facts, shuffled) in arb_facts().prop_flat_map(|f| (Just(f.clone()), Just(f).prop_shuffle()))
    ) {
        let a = GraphStore::from_facts(&facts);
        let b = GraphStore::from_facts(&shuffled);
        prop_assert_eq!(a.content_hash(), b.content_hash());
        let va = a.filter(&FilterSpec::default()).detect_cycles().global_view();
        let vb = b.filter(&FilterSpec::default()).detect_cycles().global_view();
        prop_assert_eq!(va, vb);
    }

    #[test]
    fn filtered_edges_are_exactly_the_allowed_edges(facts in arb_facts(), cut in 0..NODE_COUNT, keep in any::<bool>()) {
        let cutoff = target_name(cut);
        let spec = FilterSpec {
            targets: NameFilter::new().exclude(Rule::new("cut", move |n| n >= cutoff.as_str())),
            libraries: LibraryFilter {
                exclude_kinds: [LibraryKind::StaticArchive, LibraryKind::PackageProduct]
                    .into_iter()
                    .collect(),
                ..LibraryFilter::default()
            },
            keep_isolated_targets: keep,
        };
        let mut original = GraphStore::from_facts(&facts);
        original.infer_package_products();
        let filtered = original.clone().filter(&spec);
        let store = filtered.store();

        let target_ok = |name: &str| original.contains_target(name) && spec.targets.allows(name);
        for (from, to) in original.edges() {
            let to_ok = target_ok(to)
                || original.library(to).is_some_and(|meta| spec.libraries.allows(to, meta));
            let expected = target_ok(from) && to_ok;
            prop_assert_eq!(store.contains_edge(from, to), expected, "edge {} -> {}", from, to);
        }
        for (from, to) in store.edges() {
            prop_assert!(original.contains_edge(from, to), "edge {} -> {} was invented", from, to);
            prop_assert!(store.contains_target(from), "edge source {} must be a target", from);
            prop_assert!(store.contains_target(to) || store.contains_library(to));
        }

        for (lib, _) in store.libraries() {
            prop_assert!(store.library_in_degree(lib) > 0, "library {} kept without edges", lib);
        }
        for target in store.targets() {
            prop_assert!(spec.targets.allows(target));
        }
        if keep {
            for target in original.targets() {
                prop_assert_eq!(store.contains_target(target), spec.targets.allows(target), "target {}", target);
            }
        }
    }

    #[test]
    fn cycles_match_mutual_reachability(facts in arb_facts()) {
        let analyzed = GraphStore::from_facts(&facts)
            .filter(&FilterSpec::default())
            .detect_cycles();
        let store = analyzed.store();
        let cycles = analyzed.cycles();

        let nodes: Vec<&str> = store.targets().chain(store.libraries().map(|(n, _)| n)).collect();
        let reach: Vec<HashSet<String>> = nodes.iter().map(|n| reachable(store, n)).collect();

        for (i, a) in nodes.iter().enumerate() {
            let self_loop = store.contains_edge(a, a);
            let has_partner = nodes.iter().enumerate().any(|(j, b)| {
                i != j && reach[i].contains(*b) && reach[j].contains(*a)
            });
            prop_assert_eq!(cycles.is_cycle_node(a), self_loop || has_partner, "node {}", a);

            for (j, b) in nodes.iter().enumerate() {
                if i == j || !cycles.is_cycle_node(a) || !cycles.is_cycle_node(b) {
                    continue;
                }
                let mutual = reach[i].contains(*b) && reach[j].contains(*a);
                prop_assert_eq!(cycles.component_of(a) == cycles.component_of(b), mutual);
            }
        }

        for (from, to) in store.edges() {
            let expected = cycles.is_cycle_node(from)
                && cycles.component_of(from) == cycles.component_of(to);
            prop_assert_eq!(cycles.is_cycle_edge(from, to), expected);
        }

        for component in cycles.components() {
            let mut sorted = component.members.clone();
            sorted.sort();
            prop_assert_eq!(&sorted, &component.members);
        }
        let mut listed = cycles.components().to_vec();
        listed.sort();
        prop_assert_eq!(listed.as_slice(), cycles.components());
    }
}
