//! Batch updates produced by imports.

use crate::grid::CellMap;

/// Cells to overwrite in one step.
///
/// A patch only names the cells it changes; absent keys keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridPatch {
    pub main_grid: CellMap,
    pub chassis_base: CellMap,
}

impl GridPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.main_grid.is_empty() && self.chassis_base.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.main_grid.len() + self.chassis_base.len()
    }
}

/// What [`crate::GridStore::apply_patch`] actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub main_cells: usize,
    pub chassis_cells: usize,
}
