//! cm-core: the capability matrix state model.
//!
//! Contains:
//! - address (cell addresses and their canonical string keys)
//! - marker (fixed legend colors, marker resolution)
//! - palette (user-added image markers)
//! - grid (the store that owns every cell, label and palette entry)
//! - patch (batch updates applied by imports)

pub mod address;
pub mod error;
pub mod grid;
pub mod marker;
pub mod palette;
pub mod patch;

pub use address::{
    CHASSIS_CELL_COUNT, CHASSIS_COLS, COLS_PER_WEEK, CellAddress, CellKey, MAIN_CELL_COUNT, ROWS,
    WEEKS, chassis_addresses, main_addresses,
};
pub use error::{CoreError, CoreResult};
pub use grid::{
    CellMap, ColorImages, GridStore, GridTarget, PaletteRemoval, StoredGrid, UpdateField,
    UpdateInfo, WeekLabels, default_week_labels, is_valid_week_label,
};
pub use marker::{FixedColor, Marker};
pub use palette::{PALETTE_ID_PREFIX, Palette, PaletteEntry};
pub use patch::{GridPatch, PatchSummary};
