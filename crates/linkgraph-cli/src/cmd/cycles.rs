//! `linkgraph cycles`: print the cycle status of a filtered graph.

use std::io::Write;

use clap::Args;
use linkgraph_core::view::CycleSummary;

use crate::cmd::{GraphArgs, Status, prepare};
use crate::output::{OutputMode, render_mode};

#[derive(Args, Debug, Default)]
pub struct CyclesArgs {
    #[command(flatten)]
    pub graph: GraphArgs,

    /// Exit with code 2 when cycles are found.
    #[arg(long)]
    pub fail_on_cycles: bool,
}

pub fn run_cycles(args: &CyclesArgs, output: OutputMode) -> anyhow::Result<Status> {
    let prepared = prepare(&args.graph)?;
    let summary = CycleSummary::from_cycles(prepared.analyzed.cycles());

    render_mode(
        output,
        &summary,
        |s, w| write!(w, "{s}"),
        render_cycles_human,
    )?;

    Ok(Status::from_cycles(args.fail_on_cycles, summary.has_cycles))
}

fn render_cycles_human(summary: &CycleSummary, w: &mut dyn Write) -> std::io::Result<()> {
    if !summary.has_cycles {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({})", summary.cycles_count)?;
    for (idx, members) in summary.components.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for name in members {
            writeln!(w, "  - {name}")?;
        }
    }
    Ok(())
}
