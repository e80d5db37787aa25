use std::collections::BTreeSet;

use super::model::{CurveType, ScanBatch};

// ---------------------------------------------------------------------------
// Filter predicate: which curve kinds and files are shown
// ---------------------------------------------------------------------------

/// Viewer selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Curve kinds currently shown.
    pub curve_types: BTreeSet<CurveType>,
    /// Positions of loaded files that are hidden.
    pub hidden_files: BTreeSet<usize>,
}

impl Default for FilterState {
    /// Everything visible.
    fn default() -> Self {
        Self {
            curve_types: CurveType::ALL.into_iter().collect(),
            hidden_files: BTreeSet::new(),
        }
    }
}

impl FilterState {
    pub fn toggle_curve_type(&mut self, kind: CurveType) {
        if !self.curve_types.remove(&kind) {
            self.curve_types.insert(kind);
        }
    }

    pub fn toggle_file(&mut self, file: usize) {
        if !self.hidden_files.remove(&file) {
            self.hidden_files.insert(file);
        }
    }
}

/// `(file, curve)` positions of every curve that passes the filter, in file
/// order and then batch order.
pub fn visible_curves(batches: &[&ScanBatch], filters: &FilterState) -> Vec<(usize, usize)> {
    batches
        .iter()
        .enumerate()
        .filter(|(file, _)| !filters.hidden_files.contains(file))
        .flat_map(|(file, batch)| {
            batch
                .scans
                .iter()
                .enumerate()
                .filter(|(_, scan)| filters.curve_types.contains(&scan.curve_type))
                .map(move |(curve, _)| (file, curve))
        })
        .collect()
}
