//! Legend colors and marker resolution.

use serde::{Deserialize, Serialize};

use crate::palette::PaletteEntry;

/// The fixed legend. `None` is always first and is stored as the empty id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixedColor {
    None,
    Green,
    Red,
    Yellow,
    Black,
    Orange,
    Blue,
}

impl FixedColor {
    pub const ALL: [FixedColor; 7] = [
        FixedColor::None,
        FixedColor::Green,
        FixedColor::Red,
        FixedColor::Yellow,
        FixedColor::Black,
        FixedColor::Orange,
        FixedColor::Blue,
    ];

    /// Marker id stored in a cell.
    pub fn id(self) -> &'static str {
        match self {
            FixedColor::None => "",
            FixedColor::Green => "green",
            FixedColor::Red => "red",
            FixedColor::Yellow => "yellow",
            FixedColor::Black => "black",
            FixedColor::Orange => "orange",
            FixedColor::Blue => "blue",
        }
    }

    pub fn display_color(self) -> &'static str {
        match self {
            FixedColor::None => "transparent",
            FixedColor::Green => "#4CAF50",
            FixedColor::Red => "#f44336",
            FixedColor::Yellow => "#FFEB3B",
            FixedColor::Black => "#333333",
            FixedColor::Orange => "#FF9800",
            FixedColor::Blue => "#2196F3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FixedColor::None => "None",
            FixedColor::Green => "Green",
            FixedColor::Red => "Red",
            FixedColor::Yellow => "Yellow",
            FixedColor::Black => "Black",
            FixedColor::Orange => "Orange",
            FixedColor::Blue => "Blue",
        }
    }

    /// Accepts the stored id, or the color name itself (`"none"` included).
    pub fn from_id(id: &str) -> Option<Self> {
        if id.eq_ignore_ascii_case("none") {
            return Some(FixedColor::None);
        }
        Self::ALL.into_iter().find(|color| color.id() == id)
    }
}

/// What a cell's stored id resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'a> {
    None,
    Color(FixedColor),
    Image(&'a PaletteEntry),
}

impl<'a> Marker<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Marker::None)
    }

    /// Id to store in a cell for this marker.
    pub fn id(&self) -> &'a str {
        match self {
            Marker::None => "",
            Marker::Color(color) => color.id(),
            Marker::Image(entry) => entry.id.as_str(),
        }
    }

    pub fn label(&self) -> &'a str {
        match self {
            Marker::None => FixedColor::None.label(),
            Marker::Color(color) => color.label(),
            Marker::Image(entry) => entry.name.as_str(),
        }
    }
}
