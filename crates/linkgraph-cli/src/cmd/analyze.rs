//! `linkgraph analyze`: run the pipeline and write DOT, JSON and cycle
//! status exports.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use linkgraph_core::AnalyzedGraph;
use linkgraph_core::graph::GraphStats;
use linkgraph_core::view::{CycleSummary, FocusOptions, FocusSelection};
use serde::Serialize;
use tracing::{info, warn};

use crate::cmd::{GraphArgs, Status, prepare};
use crate::dot::{DotStyle, Palette, render_focused, render_global, slugify};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::report::{Report, write_cycle_summary, write_file};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Base path for outputs, without extension.
    #[arg(long, value_name = "BASE", default_value = "linkgraph")]
    pub output: PathBuf,

    /// Also write a JSON report to this path.
    #[arg(long, value_name = "FILE")]
    pub json_out: Option<PathBuf>,

    /// Write one focused DOT graph per library.
    #[arg(long)]
    pub split_by_library: bool,

    /// Directory for per-library graphs (default: `<BASE>_by_library`).
    #[arg(long, value_name = "DIR")]
    pub split_dir: Option<PathBuf>,

    /// Put every per-library file directly in the split directory.
    #[arg(long)]
    pub split_flat: bool,

    /// Limit the number of per-library graphs (0 = all).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub split_max: usize,

    /// Only libraries linked by at least this many targets.
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub split_min_degree: usize,

    /// Include target → target edges in per-library graphs.
    #[arg(long)]
    pub split_include_target_deps: bool,

    /// Include other libraries linked by the same targets.
    #[arg(long)]
    pub split_include_peer_libs: bool,

    /// Skip the global graph; write only per-library graphs.
    #[arg(long)]
    pub split_only: bool,

    /// Do not highlight cycles.
    #[arg(long)]
    pub no_cycle_highlight: bool,

    /// Do not style system libraries differently.
    #[arg(long)]
    pub no_system_highlight: bool,

    /// Exit with code 2 when cycles are found (after writing outputs).
    #[arg(long)]
    pub fail_on_cycles: bool,
}

impl AnalyzeArgs {
    const fn style(&self) -> DotStyle {
        DotStyle {
            highlight_cycles: !self.no_cycle_highlight,
            highlight_system: !self.no_system_highlight,
        }
    }

    fn split_dir(&self) -> PathBuf {
        self.split_dir.clone().unwrap_or_else(|| {
            let mut dir = self.output.as_os_str().to_os_string();
            dir.push("_by_library");
            dir.into()
        })
    }
}

#[derive(Debug, Serialize)]
struct AnalyzeOutput {
    has_cycles: bool,
    cycles: Vec<Vec<String>>,
    stats: GraphStats,
    rejected_filters: usize,
    written: Vec<PathBuf>,
}

pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode) -> Result<Status> {
    let prepared = prepare(&args.graph)?;
    let analyzed = &prepared.analyzed;
    let palette = Palette::with_overrides(&prepared.file.colors);
    let style = args.style();
    let mut written = Vec::new();

    if !args.split_only {
        let path = with_extension_suffix(&args.output, ".dot");
        write_file(&path, &render_global(&analyzed.global_view(), &palette, style))?;
        info!(path = %path.display(), "wrote global graph");
        written.push(path);
    }

    let summary = CycleSummary::from_cycles(analyzed.cycles());
    let summary_path = write_cycle_summary(&args.output, &summary)?;
    info!(path = %summary_path.display(), "wrote cycle summary");
    written.push(summary_path);

    if let Some(json_path) = &args.json_out {
        Report::build(analyzed, &prepared.filters, &palette, style).write(json_path)?;
        info!(path = %json_path.display(), "wrote JSON report");
        written.push(json_path.clone());
    }

    if args.split_by_library || args.split_only {
        written.extend(write_split(analyzed, args, &palette, style)?);
    }

    if args.fail_on_cycles && summary.has_cycles {
        warn!("cycles found and --fail-on-cycles set; exiting with code 2");
    }

    let report = AnalyzeOutput {
        has_cycles: summary.has_cycles,
        cycles: summary.components,
        stats: GraphStats::from_analyzed(analyzed),
        rejected_filters: prepared.rejected_filters,
        written,
    };
    render_mode(output, &report, render_analyze_text, render_analyze_human)?;

    Ok(Status::from_cycles(args.fail_on_cycles, report.has_cycles))
}

/// Write one focused DOT file per selected library.
fn write_split(
    analyzed: &AnalyzedGraph,
    args: &AnalyzeArgs,
    palette: &Palette,
    style: DotStyle,
) -> Result<Vec<PathBuf>> {
    let dir = args.split_dir();
    let selection = FocusSelection {
        max: args.split_max,
        min_in_degree: args.split_min_degree,
    };
    let options = FocusOptions {
        include_target_edges: args.split_include_target_deps,
        include_peer_libraries: args.split_include_peer_libs,
    };

    let selected = analyzed.select_focus_libraries(&selection);
    if selected.is_empty() {
        warn!("no library meets the per-library selection criteria");
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(selected.len());
    for (library, in_degree) in selected {
        let Some(view) = analyzed.focused_view(library, &options) else {
            continue;
        };
        let slug = slugify(library);
        let path = if args.split_flat {
            dir.join(format!("{slug}.dot"))
        } else {
            dir.join(&slug).join(format!("{slug}.dot"))
        };
        write_file(&path, &render_focused(&view, palette, style))?;
        info!(library, in_degree, path = %path.display(), "wrote library graph");
        written.push(path);
    }
    info!(count = written.len(), dir = %dir.display(), "per-library export complete");
    Ok(written)
}

/// `base` + `suffix`, without treating dots in `base` as an extension.
fn with_extension_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(suffix);
    name.into()
}

fn render_analyze_text(report: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "HAS_CYCLES={}", report.has_cycles)?;
    writeln!(w, "CYCLES_COUNT={}", report.cycles.len())?;
    writeln!(w, "TARGETS={}", report.stats.target_count)?;
    writeln!(w, "LIBRARIES={}", report.stats.library_count)?;
    writeln!(w, "EDGES={}", report.stats.edge_count)?;
    for path in &report.written {
        writeln!(w, "WROTE={}", path.display())?;
    }
    Ok(())
}

fn render_analyze_human(report: &AnalyzeOutput, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Dependency graph")?;
    pretty_kv(w, "Targets", report.stats.target_count.to_string())?;
    pretty_kv(
        w,
        "Libraries",
        format!(
            "{} ({} system, {} third-party)",
            report.stats.library_count,
            report.stats.system_library_count,
            report.stats.third_party_library_count
        ),
    )?;
    pretty_kv(
        w,
        "Edges",
        format!(
            "{} ({} links, {} target deps)",
            report.stats.edge_count, report.stats.link_edge_count, report.stats.target_edge_count
        ),
    )?;
    pretty_kv(w, "Density", format!("{:.4}", report.stats.density))?;
    if report.rejected_filters > 0 {
        pretty_kv(w, "Skipped rules", report.rejected_filters.to_string())?;
    }

    writeln!(w)?;
    if report.has_cycles {
        pretty_section(w, &format!("Cycles: PRESENT ({})", report.cycles.len()))?;
        for (i, members) in report.cycles.iter().enumerate() {
            writeln!(w, "  #{}: {}", i + 1, members.join(", "))?;
        }
    } else {
        pretty_section(w, "Cycles: none")?;
    }

    writeln!(w)?;
    pretty_section(w, "Written")?;
    for path in &report.written {
        writeln!(w, "  {}", path.display())?;
    }
    Ok(())
}
