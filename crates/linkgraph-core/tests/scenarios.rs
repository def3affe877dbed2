//! Known-topology scenarios for the full build → filter → detect → view
//! pipeline.

use linkgraph_core::graph::{FilterSpec, GraphStats, GraphStore};
use linkgraph_core::view::{CycleSummary, FocusOptions, FocusSelection};
use linkgraph_core::{FactFile, FilterConfig, LibraryKind};

fn names<'a>(it: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    it.into_iter().map(String::as_str).collect()
}

#[test]
fn app_and_core_share_a_framework() {
    let mut g = GraphStore::new();
    g.add_target("App");
    g.add_target("Core");
    g.add_library("LibA", None, false, LibraryKind::Framework);
    g.add_edge("App", "LibA");
    g.add_edge("Core", "LibA");
    g.add_edge("App", "Core");

    let analyzed = g.filter(&FilterSpec::default()).detect_cycles();
    assert_eq!(analyzed.library_in_degree("LibA"), 2);
    assert!(!analyzed.cycles().has_cycles());

    let view = analyzed
        .focused_view("LibA", &FocusOptions::default())
        .expect("LibA is a library");
    assert_eq!(names(view.targets.iter().map(|t| &t.name)), vec!["App", "Core"]);
}

#[test]
fn mutual_dependency_is_one_cycle() {
    let mut g = GraphStore::new();
    g.add_target("X");
    g.add_target("Y");
    g.add_edge("X", "Y");
    g.add_edge("Y", "X");

    let analyzed = g.filter(&FilterSpec::default()).detect_cycles();
    let cycles = analyzed.cycles();
    assert_eq!(cycles.components().len(), 1);
    assert_eq!(names(&cycles.components()[0].members), vec!["X", "Y"]);
    assert!(cycles.is_cycle_edge("X", "Y"));
    assert!(cycles.is_cycle_edge("Y", "X"));
}

#[test]
fn self_loop_is_one_cycle() {
    let mut g = GraphStore::new();
    g.add_target("Z");
    g.add_edge("Z", "Z");

    let analyzed = g.filter(&FilterSpec::default()).detect_cycles();
    let summary = CycleSummary::from_cycles(analyzed.cycles());
    assert_eq!(summary.components, vec![vec!["Z".to_string()]]);
    assert_eq!(summary.to_string(), "HAS_CYCLES=true\nCYCLES_COUNT=1\nCYCLE_1=Z\n");
}

#[test]
fn excluded_test_kit_leaves_app_isolated() {
    let mut g = GraphStore::new();
    g.add_target("App");
    g.add_library("UnitTestKit", None, false, LibraryKind::Framework);
    g.add_edge("App", "UnitTestKit");

    let config = FilterConfig {
        exclude_libraries: vec![".*Test.*".to_string()],
        ..FilterConfig::default()
    };
    let compiled = config.compile();
    assert!(compiled.rejected.is_empty());

    let analyzed = g.filter(&compiled.spec).detect_cycles();
    assert!(!analyzed.store().contains_library("UnitTestKit"));
    assert!(analyzed.store().contains_target("App"));
    assert_eq!(analyzed.store().edge_count(), 0);

    let stats = GraphStats::from_analyzed(&analyzed);
    assert_eq!(stats.isolated_node_count, 1);
}

#[test]
fn fact_file_pipeline_end_to_end() {
    let file = FactFile::from_json_str(
        r#"{ "facts": [
            { "fact": "target", "name": "App" },
            { "fact": "target", "name": "Feature" },
            { "fact": "library", "name": "Networking", "subtitle": "https://github.com/acme/net" },
            { "fact": "library", "name": "UIKit", "kind": ".framework", "is_system": true },
            { "fact": "library", "name": "libz", "kind": ".tbd", "is_system": true },
            { "fact": "edge", "from": "App", "to": "Feature" },
            { "fact": "edge", "from": "Feature", "to": "App" },
            { "fact": "edge", "from": "App", "to": "UIKit" },
            { "fact": "edge", "from": "Feature", "to": "UIKit" },
            { "fact": "edge", "from": "Feature", "to": "Networking" },
            { "fact": "edge", "from": "App", "to": "libz" },
            { "fact": "edge", "from": "App", "to": "Nowhere" }
        ] }"#,
    )
    .expect("valid facts");

    let config = FilterConfig {
        exclude_kinds: vec!["tbd".to_string()],
        ..FilterConfig::default()
    };
    let compiled = config.compile();
    let filtered = GraphStore::from_facts(&file.facts).filter(&compiled.spec);
    assert_eq!(filtered.outcome().dangling_edges_dropped, 1);
    assert_eq!(filtered.outcome().edges_dropped_by_libraries, 1);
    assert_eq!(
        filtered.outcome().package_products_inferred,
        vec!["Networking".to_string()]
    );

    let analyzed = filtered.detect_cycles();
    assert_eq!(
        analyzed.library("Networking").map(|m| m.kind),
        Some(LibraryKind::PackageProduct)
    );
    assert!(analyzed.library("libz").is_none());

    let selected = analyzed.select_focus_libraries(&FocusSelection::default());
    assert_eq!(selected, vec![("UIKit", 2), ("Networking", 1)]);

    let view = analyzed
        .focused_view(
            "UIKit",
            &FocusOptions {
                include_target_edges: true,
                include_peer_libraries: true,
            },
        )
        .expect("UIKit present");
    assert!(view.targets.iter().all(|t| t.in_cycle));
    assert_eq!(view.peers.len(), 1);
    assert_eq!(view.peers[0].name, "Networking");

    let global = analyzed.global_view();
    assert_eq!(global.cycles.len(), 1);
    assert_eq!(names(&global.cycles[0].members), vec!["App", "Feature"]);
}
