//! Graphviz DOT rendering of global and focused views.
//!
//! Output is a pure function of the view, palette and style, with no
//! timestamps, so repeated runs produce byte-identical files.

use std::collections::BTreeMap;

use linkgraph_core::view::{EdgeEntry, EdgeRole, FocusedView, GlobalView, LibraryEntry, TargetEntry};
use serde::Serialize;
use tracing::warn;

const FONT: &str = "Helvetica";

/// Node and edge colours, all `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub target_fill: String,
    pub target_stroke: String,
    pub lib3p_fill: String,
    pub lib3p_stroke: String,
    pub libsys_fill: String,
    pub libsys_stroke: String,
    pub cycle_fill: String,
    pub cycle_stroke: String,
    pub focus_fill: String,
    pub focus_stroke: String,
    pub edge: String,
    pub edge_cycle: String,
    pub edge_tt: String,
    pub edge_peer: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            target_fill: "#e7f1ff".into(),
            target_stroke: "#3973ff".into(),
            lib3p_fill: "#fff7e6".into(),
            lib3p_stroke: "#ffa500".into(),
            libsys_fill: "#f1f2f6".into(),
            libsys_stroke: "#8e8e93".into(),
            cycle_fill: "#ffecec".into(),
            cycle_stroke: "#ff3b30".into(),
            focus_fill: "#eafff2".into(),
            focus_stroke: "#34c759".into(),
            edge: "#555555".into(),
            edge_cycle: "#ff3b30".into(),
            edge_tt: "#9ca3af".into(),
            edge_peer: "#cfcfcf".into(),
        }
    }
}

impl Palette {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        Some(match key {
            "target_fill" => &mut self.target_fill,
            "target_stroke" => &mut self.target_stroke,
            "lib3p_fill" => &mut self.lib3p_fill,
            "lib3p_stroke" => &mut self.lib3p_stroke,
            "libsys_fill" => &mut self.libsys_fill,
            "libsys_stroke" => &mut self.libsys_stroke,
            "cycle_fill" => &mut self.cycle_fill,
            "cycle_stroke" => &mut self.cycle_stroke,
            "focus_fill" => &mut self.focus_fill,
            "focus_stroke" => &mut self.focus_stroke,
            "edge" => &mut self.edge,
            "edge_cycle" => &mut self.edge_cycle,
            "edge_tt" => &mut self.edge_tt,
            "edge_peer" => &mut self.edge_peer,
            _ => return None,
        })
    }

    /// Default palette with valid overrides applied. Invalid colours and
    /// unknown slot names are logged and ignored.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut palette = Self::default();
        for (key, value) in overrides {
            let Some(slot) = palette.slot_mut(key) else {
                warn!(slot = %key, "unknown colour slot; ignoring");
                continue;
            };
            if is_hex_color(value) {
                slot.clone_from(value);
            } else {
                warn!(slot = %key, value = %value, default = %slot, "invalid colour; keeping default");
            }
        }
        palette
    }
}

/// `#` followed by exactly six hex digits.
pub fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotStyle {
    pub highlight_cycles: bool,
    pub highlight_system: bool,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            highlight_cycles: true,
            highlight_system: true,
        }
    }
}

/// File-system safe form of a library name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            slug.push(c);
            in_run = false;
        } else if !in_run {
            slug.push('_');
            in_run = true;
        }
    }
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

fn quote(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

struct Dot<'a> {
    out: String,
    palette: &'a Palette,
    style: DotStyle,
}

impl<'a> Dot<'a> {
    fn new(name: &str, title: &str, palette: &'a Palette, style: DotStyle) -> Self {
        let mut dot = Self {
            out: String::new(),
            palette,
            style,
        };
        dot.line(&format!("digraph {name} {{"));
        dot.line("  rankdir=LR;");
        dot.line(&format!("  graph [fontname=\"{FONT}\", fontsize=10, labelloc=\"t\"];"));
        dot.line(&format!("  node  [fontname=\"{FONT}\", fontsize=10];"));
        dot.line(&format!(
            "  edge  [fontname=\"{FONT}\", fontsize=9, color=\"{}\"];",
            palette.edge
        ));
        dot.line(&format!("  label=\"{title}\";"));
        dot.line("");
        dot
    }

    fn line(&mut self, s: &str) {
        self.out.push_str(s);
        self.out.push('\n');
    }

    fn target(&mut self, t: &TargetEntry) {
        let p = self.palette;
        let name = quote(&t.name);
        if self.style.highlight_cycles && t.in_cycle {
            self.line(&format!(
                "  \"{name}\" [shape=ellipse, style=filled, fillcolor=\"{}\", color=\"{}\", penwidth=2.0];",
                p.cycle_fill, p.cycle_stroke
            ));
        } else {
            self.line(&format!(
                "  \"{name}\" [shape=ellipse, style=filled, fillcolor=\"{}\", color=\"{}\"];",
                p.target_fill, p.target_stroke
            ));
        }
    }

    fn library(&mut self, l: &LibraryEntry, focus: bool) {
        let p = self.palette;
        let name = quote(&l.name);
        let label = match &l.subtitle {
            Some(sub) => format!("{name}\\n({})", quote(sub)),
            None => name.clone(),
        };
        let (fill, stroke, pen) = if self.style.highlight_cycles && l.in_cycle {
            (&p.cycle_fill, &p.cycle_stroke, Some(if focus { "2.2" } else { "2.0" }))
        } else if focus {
            let fill = if self.style.highlight_system && l.is_system {
                &p.libsys_fill
            } else {
                &p.focus_fill
            };
            (fill, &p.focus_stroke, Some("2.0"))
        } else if self.style.highlight_system && l.is_system {
            (&p.libsys_fill, &p.libsys_stroke, None)
        } else {
            (&p.lib3p_fill, &p.lib3p_stroke, None)
        };
        let pen = pen.map(|w| format!(", penwidth={w}")).unwrap_or_default();
        self.line(&format!(
            "  \"{name}\" [label=\"{label}\", shape=box, style=filled, fillcolor=\"{fill}\", color=\"{stroke}\"{pen}];"
        ));
    }

    /// `tint_target_edges` colours target → target edges with `edge_tt`.
    fn edge(&mut self, e: &EdgeEntry, tint_target_edges: bool) {
        let p = self.palette;
        let (from, to) = (quote(&e.from), quote(&e.to));
        if self.style.highlight_cycles && e.in_cycle {
            let solid = if e.role == EdgeRole::PeerLink { ", style=solid" } else { "" };
            self.line(&format!(
                "  \"{from}\" -> \"{to}\" [color=\"{}\", penwidth=2.2{solid}];",
                p.edge_cycle
            ));
            return;
        }
        match e.role {
            EdgeRole::TargetDependency if tint_target_edges => {
                self.line(&format!("  \"{from}\" -> \"{to}\" [color=\"{}\"];", p.edge_tt));
            }
            EdgeRole::PeerLink => self.line(&format!(
                "  \"{from}\" -> \"{to}\" [color=\"{}\", style=dashed];",
                p.edge_peer
            )),
            EdgeRole::Link | EdgeRole::TargetDependency => self.line(&format!("  \"{from}\" -> \"{to}\";")),
        }
    }

    fn legend(&mut self, focus: bool) {
        let p = self.palette;
        self.line("");
        self.line("  // Legend");
        self.line("  subgraph cluster_legend {");
        self.line("    label=\"Legend\"; fontsize=11; color=\"#cccccc\"; style=rounded;");
        self.line(&format!(
            "    \"LEG_Target\" [label=\"Target\", shape=ellipse, style=filled, fillcolor=\"{}\", color=\"{}\"];",
            p.target_fill, p.target_stroke
        ));
        let lib_node = if focus {
            self.line(&format!(
                "    \"LEG_Focus\" [label=\"Focus library\", shape=box, style=filled, fillcolor=\"{}\", color=\"{}\", penwidth=2.0];",
                p.focus_fill, p.focus_stroke
            ));
            "LEG_Focus"
        } else {
            self.line(&format!(
                "    \"LEG_Lib3P\" [label=\"3rd-party library\", shape=box, style=filled, fillcolor=\"{}\", color=\"{}\"];",
                p.lib3p_fill, p.lib3p_stroke
            ));
            self.line(&format!(
                "    \"LEG_LibSys\" [label=\"System library\", shape=box, style=filled, fillcolor=\"{}\", color=\"{}\"];",
                p.libsys_fill, p.libsys_stroke
            ));
            "LEG_Lib3P"
        };
        self.line(&format!(
            "    \"LEG_CycleNode\" [label=\"Node in cycle\", shape=box, style=filled, fillcolor=\"{}\", color=\"{}\", penwidth=2.0];",
            p.cycle_fill, p.cycle_stroke
        ));
        self.line(&format!(
            "    \"LEG_Target\" -> \"{lib_node}\" [label=\"normal edge\", fontcolor=\"{0}\", color=\"{0}\"];",
            p.edge
        ));
        self.line(&format!(
            "    \"{lib_node}\" -> \"LEG_CycleNode\" [label=\"edge in cycle\", fontcolor=\"{0}\", color=\"{0}\", penwidth=2.2];",
            p.edge_cycle
        ));
        self.line("  }");
    }

    fn finish(mut self) -> String {
        self.line("}");
        self.out
    }
}

/// DOT text for the whole graph.
pub fn render_global(view: &GlobalView, palette: &Palette, style: DotStyle) -> String {
    let status = if view.has_cycles() { "Cycles: YES" } else { "Cycles: NO" };
    let mut dot = Dot::new("LinkGraph", &format!("Dependency graph\\n{status}"), palette, style);

    dot.line("  // Targets");
    for t in &view.targets {
        dot.target(t);
    }
    dot.line("");
    dot.line("  // Libraries");
    for l in &view.libraries {
        dot.library(l, false);
    }
    dot.line("");
    dot.line("  // Edges");
    for e in &view.edges {
        dot.edge(e, false);
    }
    dot.legend(false);
    dot.finish()
}

/// DOT text for one library's focused view.
pub fn render_focused(view: &FocusedView, palette: &Palette, style: DotStyle) -> String {
    let title = format!(
        "Library view: {}\\nTargets: {}",
        quote(&view.library.name),
        view.targets.len()
    );
    let mut dot = Dot::new("LibraryView", &title, palette, style);

    dot.library(&view.library, true);
    for t in &view.targets {
        dot.target(t);
    }
    for l in &view.peers {
        dot.library(l, false);
    }
    // links, then target deps, then peers; sorted within each group
    for role in [EdgeRole::Link, EdgeRole::TargetDependency, EdgeRole::PeerLink] {
        for e in view.edges.iter().filter(|e| e.role == role) {
            dot.edge(e, true);
        }
    }
    dot.legend(true);
    dot.finish()
}

/// One-line-per-cycle description used in logs.
pub fn describe_cycle(index: usize, members: &[String], internal: &[(&str, &str)]) -> String {
    let mut s = format!("cycle #{index}: {}", members.join(", "));
    for (a, b) in internal {
        s.push_str(&format!("; {a} -> {b}"));
    }
    s
}
