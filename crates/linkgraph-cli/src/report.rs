//! JSON report and cycle status file.

use std::path::Path;

use anyhow::{Context, Result};
use linkgraph_core::graph::{FilterOutcome, GraphStats};
use linkgraph_core::view::{CycleSummary, LibraryEntry};
use linkgraph_core::{AnalyzedGraph, FilterConfig};
use serde::Serialize;

use crate::dot::{DotStyle, Palette};

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub has_cycles: bool,
    pub cycles_count: usize,
    pub content_hash: String,
    pub nodes: Nodes,
    pub edges: Vec<EdgeRef>,
    pub cycles: Cycles,
    pub filters: EffectiveFilters<'a>,
    pub filter_outcome: &'a FilterOutcome,
    pub stats: GraphStats,
    pub colors: &'a Palette,
}

#[derive(Debug, Serialize)]
pub struct Nodes {
    pub targets: Vec<String>,
    pub libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Serialize)]
pub struct EdgeRef {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct Cycles {
    pub components: Vec<Vec<String>>,
    pub edges: Vec<EdgeRef>,
}

/// The filter configuration as it was applied, kind tags normalized.
#[derive(Debug, Serialize)]
pub struct EffectiveFilters<'a> {
    pub include_targets: &'a [String],
    pub exclude_targets: &'a [String],
    pub include_libraries: &'a [String],
    pub exclude_libraries: &'a [String],
    pub include_kinds: Vec<&'static str>,
    pub exclude_kinds: Vec<&'static str>,
    pub keep_isolated_targets: bool,
    pub highlight_cycles: bool,
    pub highlight_system: bool,
}

impl<'a> Report<'a> {
    pub fn build(
        analyzed: &'a AnalyzedGraph,
        config: &'a FilterConfig,
        palette: &'a Palette,
        style: DotStyle,
    ) -> Self {
        let global = analyzed.global_view();
        let summary = CycleSummary::from_cycles(analyzed.cycles());
        Self {
            has_cycles: summary.has_cycles,
            cycles_count: summary.cycles_count,
            content_hash: analyzed.store().content_hash(),
            nodes: Nodes {
                targets: global.targets.into_iter().map(|t| t.name).collect(),
                libraries: global.libraries,
            },
            edges: global
                .edges
                .into_iter()
                .map(|e| EdgeRef { from: e.from, to: e.to })
                .collect(),
            cycles: Cycles {
                components: summary.components,
                edges: global
                    .cycle_edges
                    .into_iter()
                    .map(|(from, to)| EdgeRef { from, to })
                    .collect(),
            },
            filters: EffectiveFilters {
                include_targets: &config.include_targets,
                exclude_targets: &config.exclude_targets,
                include_libraries: &config.include_libraries,
                exclude_libraries: &config.exclude_libraries,
                include_kinds: FilterConfig::normalized_kinds(&config.include_kinds),
                exclude_kinds: FilterConfig::normalized_kinds(&config.exclude_kinds),
                keep_isolated_targets: config.keep_isolated_targets,
                highlight_cycles: style.highlight_cycles,
                highlight_system: style.highlight_system,
            },
            filter_outcome: analyzed.filter_outcome(),
            stats: GraphStats::from_analyzed(analyzed),
            colors: palette,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut text = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        text.push('\n');
        write_file(path, &text)
    }
}

/// `<base>.cycles.txt`
pub fn cycles_summary_path(base: &Path) -> std::path::PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".cycles.txt");
    name.into()
}

pub fn write_cycle_summary(base: &Path, summary: &CycleSummary) -> Result<std::path::PathBuf> {
    let path = cycles_summary_path(base);
    write_file(&path, &summary.to_string())?;
    Ok(path)
}

/// Write `contents`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
