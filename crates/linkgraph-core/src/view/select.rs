//! Choosing which libraries get a focused view.

use std::cmp::Reverse;

use crate::graph::AnalyzedGraph;

/// Selection criteria for focused views.
///
/// A `min_in_degree` of 0 or 1 keeps every library (each surviving library
/// has at least one linking target). A `max` of 0 means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusSelection {
    pub max: usize,
    pub min_in_degree: usize,
}

impl Default for FocusSelection {
    fn default() -> Self {
        Self {
            max: 0,
            min_in_degree: 1,
        }
    }
}

impl AnalyzedGraph {
    /// Libraries ordered by descending in-degree, then case-insensitive name,
    /// then exact name, filtered and truncated per `selection`.
    #[must_use]
    pub fn select_focus_libraries(&self, selection: &FocusSelection) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self
            .library_in_degrees()
            .filter(|&(_, degree)| degree >= selection.min_in_degree)
            .collect();
        ranked.sort_by_cached_key(|&(name, degree)| (Reverse(degree), name.to_lowercase(), name));
        if selection.max > 0 {
            ranked.truncate(selection.max);
        }
        ranked
    }
}
