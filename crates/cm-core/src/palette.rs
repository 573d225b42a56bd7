//! User-managed image markers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for generated palette ids; keeps them disjoint from color ids.
pub const PALETTE_ID_PREFIX: &str = "img-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    pub id: String,
    pub image_data_uri: String,
    pub name: String,
}

/// Ordered, append/remove-only list of image markers.
///
/// Entries are addressed by id, and by position for keyboard shortcuts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries; later repeats of an id are dropped.
    pub fn from_entries(entries: Vec<PaletteEntry>) -> Self {
        let mut palette = Self { entries };
        palette.dedup_ids();
        palette
    }

    /// Keep only the first entry for each id. Returns how many were dropped.
    pub fn dedup_ids(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::new();
        self.entries.retain(|entry| seen.insert(entry.id.clone()));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Positional lookup; `None` once `index >= len`.
    pub fn by_index(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    /// Append a new entry and return its generated id.
    pub fn add(&mut self, name: impl Into<String>, image_data_uri: impl Into<String>) -> String {
        let id = self.fresh_id();
        self.entries.push(PaletteEntry {
            id: id.clone(),
            image_data_uri: image_data_uri.into(),
            name: name.into(),
        });
        id
    }

    pub fn remove(&mut self, id: &str) -> Option<PaletteEntry> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(index))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = format!("{}{}", PALETTE_ID_PREFIX, Uuid::new_v4().simple());
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_in_order_with_unique_ids() {
        let mut palette = Palette::new();
        let a = palette.add("Engine", "data:image/png;base64,AAA");
        let b = palette.add("Frame", "data:image/png;base64,BBB");

        assert_ne!(a, b);
        assert!(a.starts_with(PALETTE_ID_PREFIX));
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.by_index(0).unwrap().id, a);
        assert_eq!(palette.by_index(1).unwrap().name, "Frame");
        assert!(palette.by_index(2).is_none());
    }

    #[test]
    fn remove_shifts_positions() {
        let mut palette = Palette::new();
        let a = palette.add("A", "data:,a");
        let b = palette.add("B", "data:,b");

        let removed = palette.remove(&a).unwrap();
        assert_eq!(removed.name, "A");
        assert_eq!(palette.by_index(0).unwrap().id, b);
        assert!(palette.remove(&a).is_none());
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut palette = Palette::new();
        let id = palette.add("A", "data:,a");
        let json = serde_json::to_value(&palette).unwrap();
        assert_eq!(json[0]["id"], id.as_str());
        assert_eq!(json[0]["imageDataUri"], "data:,a");
        assert_eq!(json[0]["name"], "A");
    }

    #[test]
    fn repeated_ids_keep_first_entry() {
        let entry = |id: &str, name: &str| PaletteEntry {
            id: id.to_string(),
            image_data_uri: "data:,x".to_string(),
            name: name.to_string(),
        };
        let palette = Palette::from_entries(vec![
            entry("img-a", "First"),
            entry("img-b", "Other"),
            entry("img-a", "Second"),
        ]);
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.get("img-a").unwrap().name, "First");
        assert_eq!(palette.by_index(1).unwrap().id, "img-b");
    }
}
