pub mod analyze;
pub mod cycles;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use linkgraph_core::{AnalyzedGraph, FactFile, FilterConfig, GraphStore};
use tracing::{info, warn};

use crate::dot::describe_cycle;
use crate::settings::FileConfig;

/// How a command wants the process to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// `--fail-on-cycles` was given and the graph has cycles.
    CyclesFound,
}

impl Status {
    pub const fn from_cycles(fail_on_cycles: bool, has_cycles: bool) -> Self {
        if fail_on_cycles && has_cycles {
            Self::CyclesFound
        } else {
            Self::Success
        }
    }
}

/// Input and filter flags shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct GraphArgs {
    /// JSON fact file describing targets, libraries and edges.
    #[arg(long, value_name = "FILE")]
    pub facts: PathBuf,

    /// TOML config with `[filters]` and `[colors]` tables.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Regex of targets to include (repeatable).
    #[arg(long = "include-target", value_name = "RE")]
    pub include_targets: Vec<String>,

    /// Regex of targets to exclude (repeatable).
    #[arg(long = "exclude-target", value_name = "RE")]
    pub exclude_targets: Vec<String>,

    /// Regex of library names to include (repeatable).
    #[arg(long = "include-lib", value_name = "RE")]
    pub include_libraries: Vec<String>,

    /// Regex of library names to exclude (repeatable).
    #[arg(long = "exclude-lib", value_name = "RE")]
    pub exclude_libraries: Vec<String>,

    /// Library kind to include: .a, .dylib, .tbd, .framework, spm (repeatable).
    #[arg(long = "include-kind", value_name = "TAG")]
    pub include_kinds: Vec<String>,

    /// Library kind to exclude (repeatable).
    #[arg(long = "exclude-kind", value_name = "TAG")]
    pub exclude_kinds: Vec<String>,

    /// Drop targets left without edges after filtering.
    #[arg(long)]
    pub drop_isolated_targets: bool,
}

impl GraphArgs {
    /// Filter settings from the command line alone.
    fn flag_config(&self) -> FilterConfig {
        FilterConfig {
            include_targets: self.include_targets.clone(),
            exclude_targets: self.exclude_targets.clone(),
            include_libraries: self.include_libraries.clone(),
            exclude_libraries: self.exclude_libraries.clone(),
            include_kinds: self.include_kinds.clone(),
            exclude_kinds: self.exclude_kinds.clone(),
            keep_isolated_targets: !self.drop_isolated_targets,
        }
    }
}

/// Everything a command needs after the pipeline has run.
pub struct Prepared {
    pub analyzed: AnalyzedGraph,
    /// Config file filters with command-line flags appended.
    pub filters: FilterConfig,
    pub file: FileConfig,
    pub rejected_filters: usize,
}

/// Load facts and config, then run filter and cycle detection.
pub fn prepare(args: &GraphArgs) -> Result<Prepared> {
    let file = FileConfig::load(args.config.as_deref())?;

    let facts = FactFile::load(&args.facts)?;

    let mut filters = file.filters.clone();
    filters.merge(args.flag_config());
    let compiled = filters.compile();

    let store = GraphStore::from_facts(&facts.facts);
    let analyzed = store.filter(&compiled.spec).detect_cycles();
    log_cycles(&analyzed);

    Ok(Prepared {
        analyzed,
        filters,
        file,
        rejected_filters: compiled.rejected.len(),
    })
}

fn log_cycles(analyzed: &AnalyzedGraph) {
    let cycles = analyzed.cycles();
    if !cycles.has_cycles() {
        info!("no cycles detected");
        return;
    }
    for (i, component) in cycles.components().iter().enumerate() {
        let internal = cycles.internal_edges(i);
        warn!("{}", describe_cycle(i + 1, &component.members, &internal));
    }
}
