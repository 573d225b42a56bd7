//! The in-memory grid store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{
    CHASSIS_CELL_COUNT, CellAddress, CellKey, MAIN_CELL_COUNT, WEEKS, chassis_addresses,
    main_addresses,
};
use crate::error::{CoreError, CoreResult};
use crate::marker::{FixedColor, Marker};
use crate::palette::{Palette, PaletteEntry};
use crate::patch::{GridPatch, PatchSummary};

pub type CellMap = BTreeMap<CellKey, String>;
pub type WeekLabels = BTreeMap<u8, String>;
pub type ColorImages = BTreeMap<FixedColor, String>;

/// Which cell block an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridTarget {
    Main,
    Chassis,
}

impl GridTarget {
    pub fn name(self) -> &'static str {
        match self {
            GridTarget::Main => "main",
            GridTarget::Chassis => "chassis",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "main" => Some(GridTarget::Main),
            "chassis" => Some(GridTarget::Chassis),
            _ => None,
        }
    }
}

/// Free-text "last updated" header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateInfo {
    pub updated_date: String,
    pub updated_time: String,
    pub updated_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateField {
    Date,
    Time,
    EditedBy,
}

impl UpdateInfo {
    pub fn get(&self, field: UpdateField) -> &str {
        match field {
            UpdateField::Date => &self.updated_date,
            UpdateField::Time => &self.updated_time,
            UpdateField::EditedBy => &self.updated_by,
        }
    }

    fn slot(&mut self, field: UpdateField) -> &mut String {
        match field {
            UpdateField::Date => &mut self.updated_date,
            UpdateField::Time => &mut self.updated_time,
            UpdateField::EditedBy => &mut self.updated_by,
        }
    }
}

/// Untyped dataset contents as read back from storage.
///
/// Keys are plain strings here; [`GridStore::restore`] drops anything that
/// is not a cell of the right block.
#[derive(Debug, Clone, Default)]
pub struct StoredGrid {
    pub main_grid: BTreeMap<String, String>,
    pub chassis_base: BTreeMap<String, String>,
    pub week_labels: BTreeMap<u8, String>,
    pub update_info: UpdateInfo,
    pub palette: Palette,
    pub color_images: ColorImages,
}

/// Result of removing a palette entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteRemoval {
    pub entry: PaletteEntry,
    pub cleared_main: usize,
    pub cleared_chassis: usize,
}

/// Owner of all matrix state.
///
/// Invariants:
/// - `main_grid` holds exactly [`MAIN_CELL_COUNT`] keys, `chassis_base`
///   exactly [`CHASSIS_CELL_COUNT`]; keys are never added or removed after
///   construction, only their values change
/// - `week_labels` holds one label of 0-2 ASCII digits per week
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridStore {
    main_grid: CellMap,
    chassis_base: CellMap,
    week_labels: WeekLabels,
    update_info: UpdateInfo,
    palette: Palette,
    color_images: ColorImages,
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GridStore {
    /// Fresh store: every cell empty, week labels `"01".."12"`.
    pub fn new() -> Self {
        Self {
            main_grid: empty_cells(main_addresses()),
            chassis_base: empty_cells(chassis_addresses()),
            week_labels: default_week_labels(),
            update_info: UpdateInfo::default(),
            palette: Palette::new(),
            color_images: ColorImages::new(),
        }
    }

    /// Rebuild from stored datasets, overlaying them on the defaults.
    pub fn restore(stored: StoredGrid) -> Self {
        let mut store = Self::new();

        overlay_cells(&mut store.main_grid, stored.main_grid);
        overlay_cells(&mut store.chassis_base, stored.chassis_base);
        for (week, label) in stored.week_labels {
            store.set_week_label(week, &label);
        }
        store.update_info = stored.update_info;
        store.palette = stored.palette;
        let duplicates = store.palette.dedup_ids();
        if duplicates > 0 {
            debug!(duplicates, "dropping repeated palette ids");
        }
        store.color_images = stored
            .color_images
            .into_iter()
            .filter(|(color, _)| *color != FixedColor::None)
            .collect();

        store.assert_invariants();
        store
    }

    pub fn main_grid(&self) -> &CellMap {
        &self.main_grid
    }

    pub fn chassis_base(&self) -> &CellMap {
        &self.chassis_base
    }

    pub fn cells(&self, target: GridTarget) -> &CellMap {
        match target {
            GridTarget::Main => &self.main_grid,
            GridTarget::Chassis => &self.chassis_base,
        }
    }

    fn cells_mut(&mut self, target: GridTarget) -> &mut CellMap {
        match target {
            GridTarget::Main => &mut self.main_grid,
            GridTarget::Chassis => &mut self.chassis_base,
        }
    }

    /// Stored marker id of one cell (empty when unset).
    pub fn cell(&self, target: GridTarget, key: &str) -> Option<&str> {
        self.cells(target).get(key).map(String::as_str)
    }

    pub fn cell_at(&self, address: CellAddress) -> &str {
        let target = if address.is_chassis() {
            GridTarget::Chassis
        } else {
            GridTarget::Main
        };
        self.cell(target, address.key().as_str()).unwrap_or_default()
    }

    pub fn filled_count(&self, target: GridTarget) -> usize {
        self.cells(target).values().filter(|v| !v.is_empty()).count()
    }

    pub fn week_labels(&self) -> &WeekLabels {
        &self.week_labels
    }

    pub fn week_label(&self, week: u8) -> Option<&str> {
        self.week_labels.get(&week).map(String::as_str)
    }

    pub fn update_info(&self) -> &UpdateInfo {
        &self.update_info
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn color_images(&self) -> &ColorImages {
        &self.color_images
    }

    pub fn color_image(&self, color: FixedColor) -> Option<&str> {
        self.color_images.get(&color).map(String::as_str)
    }

    /// Overwrite one cell with a resolvable marker id.
    ///
    /// The empty id (or `"none"`) clears the cell.
    pub fn set_cell(&mut self, target: GridTarget, key: &str, marker: &str) -> CoreResult<()> {
        if !self.cells(target).contains_key(key) {
            return Err(CoreError::UnknownCell {
                target: target.name(),
                key: key.to_string(),
            });
        }

        let stored = match self.lookup_marker(marker) {
            Some(resolved) => resolved.id().to_string(),
            None => {
                return Err(CoreError::UnknownMarker {
                    id: marker.to_string(),
                });
            }
        };

        if let Some(slot) = self.cells_mut(target).get_mut(key) {
            *slot = stored;
        }
        Ok(())
    }

    /// Assign the palette entry at `index`. Returns `false` (and changes
    /// nothing) when `index` is past the end of the palette.
    pub fn set_cell_from_palette_index(
        &mut self,
        target: GridTarget,
        key: &str,
        index: usize,
    ) -> CoreResult<bool> {
        let Some(id) = self.palette.by_index(index).map(|entry| entry.id.clone()) else {
            if !self.cells(target).contains_key(key) {
                return Err(CoreError::UnknownCell {
                    target: target.name(),
                    key: key.to_string(),
                });
            }
            debug!(index, palette_len = self.palette.len(), "palette index out of range");
            return Ok(false);
        };
        self.set_cell(target, key, &id)?;
        Ok(true)
    }

    /// Set a week's display label. Anything other than 0-2 ASCII digits, or a
    /// week outside `1..=12`, is ignored and `false` is returned.
    pub fn set_week_label(&mut self, week: u8, text: &str) -> bool {
        if !(1..=WEEKS).contains(&week) || !is_valid_week_label(text) {
            debug!(week, text, "week label rejected");
            return false;
        }
        self.week_labels.insert(week, text.to_string());
        true
    }

    pub fn set_update_info(&mut self, field: UpdateField, text: &str) {
        *self.update_info.slot(field) = text.to_string();
    }

    pub fn add_palette_entry(
        &mut self,
        name: impl Into<String>,
        image_data_uri: impl Into<String>,
    ) -> String {
        self.palette.add(name, image_data_uri)
    }

    /// Remove a palette entry and clear every cell that still points at it.
    pub fn remove_palette_entry(&mut self, id: &str) -> Option<PaletteRemoval> {
        let entry = self.palette.remove(id)?;
        let cleared_main = clear_matching(&mut self.main_grid, id);
        let cleared_chassis = clear_matching(&mut self.chassis_base, id);
        Some(PaletteRemoval {
            entry,
            cleared_main,
            cleared_chassis,
        })
    }

    /// Attach an image to a legend color. `FixedColor::None` cannot carry one.
    pub fn set_color_image(
        &mut self,
        color: FixedColor,
        image_data_uri: impl Into<String>,
    ) -> bool {
        if color == FixedColor::None {
            return false;
        }
        self.color_images.insert(color, image_data_uri.into());
        true
    }

    pub fn clear_color_image(&mut self, color: FixedColor) -> bool {
        self.color_images.remove(&color).is_some()
    }

    /// Resolve a stored id; unknown or empty ids resolve to [`Marker::None`].
    pub fn resolve_marker(&self, id: &str) -> Marker<'_> {
        self.lookup_marker(id).unwrap_or(Marker::None)
    }

    fn lookup_marker(&self, id: &str) -> Option<Marker<'_>> {
        if let Some(color) = FixedColor::from_id(id) {
            return Some(match color {
                FixedColor::None => Marker::None,
                color => Marker::Color(color),
            });
        }
        self.palette.get(id).map(Marker::Image)
    }

    /// Overwrite the cells named in `patch`. Week labels are never touched.
    ///
    /// Marker ids are written as given; unresolved ids read back as
    /// [`Marker::None`] through [`GridStore::resolve_marker`].
    pub fn apply_patch(&mut self, patch: &GridPatch) -> PatchSummary {
        let main_cells = overwrite_existing(&mut self.main_grid, &patch.main_grid);
        let chassis_cells = overwrite_existing(&mut self.chassis_base, &patch.chassis_base);
        self.assert_invariants();

        PatchSummary {
            main_cells,
            chassis_cells,
        }
    }

    /// Reset everything to the defaults of [`GridStore::new`].
    pub fn clear_all(&mut self) {
        *self = Self::new();
    }

    /// Storage form of the current state.
    pub fn to_stored(&self) -> StoredGrid {
        StoredGrid {
            main_grid: raw_cells(&self.main_grid),
            chassis_base: raw_cells(&self.chassis_base),
            week_labels: self.week_labels.clone(),
            update_info: self.update_info.clone(),
            palette: self.palette.clone(),
            color_images: self.color_images.clone(),
        }
    }

    fn assert_invariants(&self) {
        debug_assert_eq!(self.main_grid.len(), MAIN_CELL_COUNT);
        debug_assert_eq!(self.chassis_base.len(), CHASSIS_CELL_COUNT);
        debug_assert_eq!(self.week_labels.len(), WEEKS as usize);
    }
}

pub fn is_valid_week_label(text: &str) -> bool {
    text.len() <= 2 && text.bytes().all(|b| b.is_ascii_digit())
}

pub fn default_week_labels() -> WeekLabels {
    (1..=WEEKS).map(|week| (week, format!("{:02}", week))).collect()
}

fn empty_cells(addresses: impl Iterator<Item = CellAddress>) -> CellMap {
    addresses.map(|address| (address.key(), String::new())).collect()
}

fn overlay_cells(cells: &mut CellMap, stored: BTreeMap<String, String>) {
    for (key, value) in stored {
        match cells.get_mut(key.as_str()) {
            Some(slot) => *slot = value,
            None => debug!(%key, "dropping stored value for unknown cell"),
        }
    }
}

fn overwrite_existing(cells: &mut CellMap, patch: &CellMap) -> usize {
    let mut written = 0;
    for (key, value) in patch {
        if let Some(slot) = cells.get_mut(key) {
            slot.clone_from(value);
            written += 1;
        }
    }
    written
}

fn clear_matching(cells: &mut CellMap, id: &str) -> usize {
    let mut cleared = 0;
    for value in cells.values_mut().filter(|value| value.as_str() == id) {
        value.clear();
        cleared += 1;
    }
    cleared
}

fn raw_cells(cells: &CellMap) -> BTreeMap<String, String> {
    cells
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}
