//! Cycle status summary for CI and status lines.

use std::fmt;

use serde::Serialize;

use crate::graph::CycleState;

/// Cycle status in a stable, line-oriented form.
///
/// ```text
/// HAS_CYCLES=true
/// CYCLES_COUNT=1
/// CYCLE_1=X,Y
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub has_cycles: bool,
    pub cycles_count: usize,
    pub components: Vec<Vec<String>>,
}

impl CycleSummary {
    #[must_use]
    pub fn from_cycles(cycles: &CycleState) -> Self {
        let components: Vec<Vec<String>> = cycles
            .components()
            .iter()
            .map(|c| c.members.clone())
            .collect();
        Self {
            has_cycles: !components.is_empty(),
            cycles_count: components.len(),
            components,
        }
    }
}

impl fmt::Display for CycleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HAS_CYCLES={}", self.has_cycles)?;
        writeln!(f, "CYCLES_COUNT={}", self.cycles_count)?;
        for (i, members) in self.components.iter().enumerate() {
            writeln!(f, "CYCLE_{}={}", i + 1, members.join(","))?;
        }
        Ok(())
    }
}
