//! Names of the persisted datasets.

use core::fmt;

pub const DEFAULT_NAMESPACE: &str = "capabilityMatrix";

/// One independently persisted piece of matrix state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dataset {
    GridData,
    ChassisBase,
    WeekNumbers,
    UpdateInfo,
    PaletteImages,
    ColorImages,
}

impl Dataset {
    pub const ALL: [Dataset; 6] = [
        Dataset::GridData,
        Dataset::ChassisBase,
        Dataset::WeekNumbers,
        Dataset::UpdateInfo,
        Dataset::PaletteImages,
        Dataset::ColorImages,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::GridData => "gridData",
            Dataset::ChassisBase => "chassisBase",
            Dataset::WeekNumbers => "weekNumbers",
            Dataset::UpdateInfo => "updateInfo",
            Dataset::PaletteImages => "paletteImages",
            Dataset::ColorImages => "colorImages",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
