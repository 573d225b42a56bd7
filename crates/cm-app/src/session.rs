//! Grid store plus persistence, kept in step.
//!
//! Every mutating method here changes the store and then saves each dataset
//! it touched, so reopening a session from the same backend rebuilds an
//! equivalent store. Rejected changes save nothing.

use std::collections::BTreeMap;

use cm_core::{
    ColorImages, FixedColor, GridStore, GridTarget, Marker, Palette, PaletteRemoval, PatchSummary,
    StoredGrid, UpdateField, UpdateInfo, default_week_labels,
};
use cm_store::{Dataset, KeyValueStore, Persistence};
use tracing::{info, warn};

use crate::error::AppResult;

pub struct MatrixSession<S> {
    store: GridStore,
    persistence: Persistence<S>,
}

impl<S: KeyValueStore> MatrixSession<S> {
    /// Restore every dataset from `persistence`, falling back to defaults.
    pub fn open(persistence: Persistence<S>) -> Self {
        let stored = StoredGrid {
            main_grid: persistence.load(Dataset::GridData, BTreeMap::new()),
            chassis_base: persistence.load(Dataset::ChassisBase, BTreeMap::new()),
            week_labels: persistence.load(Dataset::WeekNumbers, default_week_labels()),
            update_info: persistence.load(Dataset::UpdateInfo, UpdateInfo::default()),
            palette: persistence.load(Dataset::PaletteImages, Palette::new()),
            color_images: persistence.load(Dataset::ColorImages, ColorImages::new()),
        };
        Self {
            store: GridStore::restore(stored),
            persistence,
        }
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn into_persistence(self) -> Persistence<S> {
        self.persistence
    }

    fn save(&mut self, dataset: Dataset) {
        let store = &self.store;
        let persistence = &mut self.persistence;
        match dataset {
            Dataset::GridData => persistence.save(dataset, store.main_grid()),
            Dataset::ChassisBase => persistence.save(dataset, store.chassis_base()),
            Dataset::WeekNumbers => persistence.save(dataset, store.week_labels()),
            Dataset::UpdateInfo => persistence.save(dataset, store.update_info()),
            Dataset::PaletteImages => persistence.save(dataset, store.palette()),
            Dataset::ColorImages => persistence.save(dataset, store.color_images()),
        };
    }

    fn save_cells(&mut self, target: GridTarget) {
        self.save(match target {
            GridTarget::Main => Dataset::GridData,
            GridTarget::Chassis => Dataset::ChassisBase,
        });
    }

    pub fn set_cell(&mut self, target: GridTarget, key: &str, marker: &str) -> AppResult<()> {
        self.store.set_cell(target, key, marker)?;
        self.save_cells(target);
        Ok(())
    }

    pub fn set_cell_from_palette_index(
        &mut self,
        target: GridTarget,
        key: &str,
        index: usize,
    ) -> AppResult<bool> {
        let assigned = self.store.set_cell_from_palette_index(target, key, index)?;
        if assigned {
            self.save_cells(target);
        }
        Ok(assigned)
    }

    pub fn set_week_label(&mut self, week: u8, text: &str) -> bool {
        let accepted = self.store.set_week_label(week, text);
        if accepted {
            self.save(Dataset::WeekNumbers);
        }
        accepted
    }

    pub fn set_update_info(&mut self, field: UpdateField, text: &str) {
        self.store.set_update_info(field, text);
        self.save(Dataset::UpdateInfo);
    }

    pub fn add_palette_entry(&mut self, name: &str, image_data_uri: &str) -> String {
        let id = self.store.add_palette_entry(name, image_data_uri);
        self.save(Dataset::PaletteImages);
        id
    }

    /// Remove a palette entry; cells that used it are cleared and saved too.
    pub fn remove_palette_entry(&mut self, id: &str) -> Option<PaletteRemoval> {
        let removal = self.store.remove_palette_entry(id)?;
        self.save(Dataset::PaletteImages);
        self.save(Dataset::GridData);
        self.save(Dataset::ChassisBase);
        info!(
            id,
            cleared_main = removal.cleared_main,
            cleared_chassis = removal.cleared_chassis,
            "palette entry removed"
        );
        Some(removal)
    }

    pub fn set_color_image(&mut self, color: FixedColor, image_data_uri: &str) -> bool {
        let changed = self.store.set_color_image(color, image_data_uri);
        if changed {
            self.save(Dataset::ColorImages);
        }
        changed
    }

    pub fn clear_color_image(&mut self, color: FixedColor) -> bool {
        let changed = self.store.clear_color_image(color);
        if changed {
            self.save(Dataset::ColorImages);
        }
        changed
    }

    pub fn resolve_marker(&self, id: &str) -> Marker<'_> {
        self.store.resolve_marker(id)
    }

    /// Reset to defaults and drop every persisted dataset.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.persistence.purge_all();
        info!("matrix cleared");
    }

    pub fn export_csv(&self) -> AppResult<String> {
        Ok(cm_csv::encode(&self.store)?)
    }

    /// Import CSV file contents. On failure nothing changes.
    pub fn import_csv(&mut self, bytes: &[u8]) -> AppResult<PatchSummary> {
        let patch = match cm_csv::decode_bytes(bytes) {
            Ok(patch) => patch,
            Err(e) => {
                warn!(error = %e, "CSV import rejected");
                return Err(e.into());
            }
        };

        let summary = self.store.apply_patch(&patch);
        if summary.main_cells > 0 {
            self.save(Dataset::GridData);
        }
        if summary.chassis_cells > 0 {
            self.save(Dataset::ChassisBase);
        }
        info!(
            main_cells = summary.main_cells,
            chassis_cells = summary.chassis_cells,
            "CSV imported"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_store::MemoryStore;

    fn session() -> MatrixSession<MemoryStore> {
        MatrixSession::open(Persistence::with_default_namespace(MemoryStore::new()))
    }

    fn reopen(session: MatrixSession<MemoryStore>) -> MatrixSession<MemoryStore> {
        MatrixSession::open(session.into_persistence())
    }

    #[test]
    fn empty_backend_opens_with_defaults() {
        let session = session();
        assert_eq!(session.store(), &GridStore::new());
        assert!(session.persistence().backend().is_empty());
    }

    #[test]
    fn every_mutation_survives_reopen() {
        let mut session = session();
        session.set_cell(GridTarget::Main, "1-1-1", "red").unwrap();
        session.set_cell(GridTarget::Chassis, "30-3", "blue").unwrap();
        assert!(session.set_week_label(4, "17"));
        session.set_update_info(UpdateField::EditedBy, "QA");
        let id = session.add_palette_entry("Gear", "data:image/png;base64,AAAA");
        assert!(session.set_cell_from_palette_index(GridTarget::Main, "2-2-2", 0).unwrap());
        assert!(session.set_color_image(FixedColor::Green, "data:image/png;base64,BBBB"));

        let expected = session.store().clone();
        let session = reopen(session);
        assert_eq!(session.store(), &expected);
        assert_eq!(session.store().cell(GridTarget::Main, "2-2-2"), Some(id.as_str()));
        assert_eq!(session.store().week_label(4), Some("17"));
    }

    #[test]
    fn rejected_changes_are_not_written() {
        let mut session = session();
        assert!(!session.set_week_label(1, "123"));
        assert!(!session.set_cell_from_palette_index(GridTarget::Main, "1-1-1", 3).unwrap());
        assert!(session.set_cell(GridTarget::Main, "31-1-1", "red").is_err());
        assert!(session.set_cell(GridTarget::Main, "1-1-1", "purple").is_err());
        assert!(!session.clear_color_image(FixedColor::Red));
        assert!(session.persistence().backend().is_empty());
    }

    #[test]
    fn palette_removal_clears_cells_in_storage() {
        let mut session = session();
        let id = session.add_palette_entry("Gear", "data:image/png;base64,AAAA");
        session.set_cell(GridTarget::Main, "3-3-3", &id).unwrap();
        session.set_cell(GridTarget::Chassis, "3-3", &id).unwrap();

        let removal = session.remove_palette_entry(&id).unwrap();
        assert_eq!((removal.cleared_main, removal.cleared_chassis), (1, 1));
        assert!(session.remove_palette_entry(&id).is_none());

        let session = reopen(session);
        assert!(session.store().palette().is_empty());
        assert_eq!(session.store().cell(GridTarget::Main, "3-3-3"), Some(""));
        assert_eq!(session.store().cell(GridTarget::Chassis, "3-3"), Some(""));
    }

    #[test]
    fn quota_failure_keeps_session_usable() {
        let persistence = Persistence::with_default_namespace(MemoryStore::with_quota(64));
        let mut session = MatrixSession::open(persistence);

        session.set_cell(GridTarget::Main, "5-5-1", "yellow").unwrap();
        assert_eq!(session.store().cell(GridTarget::Main, "5-5-1"), Some("yellow"));
        assert_eq!(session.resolve_marker("yellow").id(), "yellow");

        // The grid never fit, so a reopen falls back to an empty grid.
        let session = reopen(session);
        assert_eq!(session.store().cell(GridTarget::Main, "5-5-1"), Some(""));
    }

    #[test]
    fn clear_all_purges_storage() {
        let mut session = session();
        session.set_cell(GridTarget::Main, "1-1-1", "red").unwrap();
        session.set_update_info(UpdateField::Date, "2024-01-01");
        assert!(!session.persistence().backend().is_empty());

        session.clear_all();
        assert_eq!(session.store(), &GridStore::new());
        assert!(session.persistence().backend().is_empty());
    }

    #[test]
    fn import_applies_and_persists() {
        let mut source = session();
        source.set_cell(GridTarget::Main, "6-2-1", "orange").unwrap();
        source.set_cell(GridTarget::Chassis, "6-1", "black").unwrap();
        source.set_week_label(2, "9");
        let csv = source.export_csv().unwrap();

        let mut target = session();
        assert!(target.set_week_label(2, "33"));
        let summary = target.import_csv(csv.as_bytes()).unwrap();
        assert_eq!(summary.main_cells, 1);
        assert_eq!(summary.chassis_cells, 1);

        let target = reopen(target);
        assert_eq!(target.store().cell(GridTarget::Main, "6-2-1"), Some("orange"));
        assert_eq!(target.store().cell(GridTarget::Chassis, "6-1"), Some("black"));
        assert_eq!(target.store().week_label(2), Some("33"));
    }

    #[test]
    fn failed_import_changes_nothing() {
        let mut session = session();
        session.set_cell(GridTarget::Main, "1-1-1", "red").unwrap();
        let before = session.store().clone();

        let err = session.import_csv(b"").unwrap_err();
        assert!(err.is_import_failure());
        let err = session
            .import_csv(b"\"Row\"\n\"1\",\"\xff\",\"\",\"\"\n")
            .unwrap_err();
        assert!(err.is_import_failure());
        assert_eq!(session.store(), &before);
    }
}
