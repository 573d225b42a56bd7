//! Cell addresses and their canonical string keys.
//!
//! Two key shapes exist:
//! - `"{row}-{week}-{col}"` for the week grid
//! - `"{row}-{col}"` for the chassis-base block
//!
//! Keys are the only identity used by storage and by the CSV column order, so
//! decoding only accepts the exact text that encoding would produce.

use core::borrow::Borrow;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub const ROWS: u8 = 30;
pub const WEEKS: u8 = 12;
pub const COLS_PER_WEEK: u8 = 3;
pub const CHASSIS_COLS: u8 = 3;

pub const MAIN_CELL_COUNT: usize = ROWS as usize * WEEKS as usize * COLS_PER_WEEK as usize;
pub const CHASSIS_CELL_COUNT: usize = ROWS as usize * CHASSIS_COLS as usize;

/// Structured position of one cell.
///
/// `week == None` addresses the chassis-base block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    row: u8,
    week: Option<u8>,
    col: u8,
}

impl CellAddress {
    pub fn new(row: u8, week: Option<u8>, col: u8) -> CoreResult<Self> {
        check_bound("row", row, ROWS)?;
        match week {
            Some(week) => {
                check_bound("week", week, WEEKS)?;
                check_bound("column", col, COLS_PER_WEEK)?;
            }
            None => check_bound("column", col, CHASSIS_COLS)?,
        }
        Ok(Self { row, week, col })
    }

    pub fn grid(row: u8, week: u8, col: u8) -> CoreResult<Self> {
        Self::new(row, Some(week), col)
    }

    pub fn chassis(row: u8, col: u8) -> CoreResult<Self> {
        Self::new(row, None, col)
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn week(self) -> Option<u8> {
        self.week
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn is_chassis(self) -> bool {
        self.week.is_none()
    }

    /// Encode into the canonical key.
    pub fn key(self) -> CellKey {
        let text = match self.week {
            Some(week) => format!("{}-{}-{}", self.row, week, self.col),
            None => format!("{}-{}", self.row, self.col),
        };
        CellKey(text)
    }

    /// Decode a key produced by [`CellAddress::key`].
    pub fn from_key(key: &str) -> CoreResult<Self> {
        let malformed = || CoreError::MalformedKey {
            key: key.to_string(),
        };

        let parts = key
            .split('-')
            .map(parse_component)
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(malformed)?;

        let address = match parts.as_slice() {
            [row, week, col] => Self::grid(*row, *week, *col),
            [row, col] => Self::chassis(*row, *col),
            _ => return Err(malformed()),
        }
        .map_err(|_| malformed())?;

        Ok(address)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.week {
            Some(week) => write!(f, "row {} week {} col {}", self.row, week, self.col),
            None => write!(f, "row {} chassis col {}", self.row, self.col),
        }
    }
}

fn check_bound(what: &'static str, value: u8, max: u8) -> CoreResult<()> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::OutOfBounds {
            what,
            value: value.into(),
            max: max.into(),
        })
    }
}

/// Only plain decimal digits without a leading zero; `u8::from_str` alone
/// would also accept `"+1"` and `"01"`.
fn parse_component(part: &str) -> Option<u8> {
    let canonical = !part.is_empty()
        && part.bytes().all(|b| b.is_ascii_digit())
        && !(part.len() > 1 && part.starts_with('0'));
    if canonical { part.parse().ok() } else { None }
}

/// Canonical string key of a [`CellAddress`].
///
/// A `CellKey` can only be obtained from a valid address (or by parsing text
/// that decodes to one), so every key in a store refers to a real cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellKey(String);

impl CellKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn address(&self) -> CoreResult<CellAddress> {
        CellAddress::from_key(&self.0)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CellKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        CellAddress::from_key(s).map(CellAddress::key)
    }
}

impl TryFrom<String> for CellKey {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.0
    }
}

impl Borrow<str> for CellKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<CellAddress> for CellKey {
    fn from(address: CellAddress) -> Self {
        address.key()
    }
}

/// Every main-grid address in row, week, column order.
pub fn main_addresses() -> impl Iterator<Item = CellAddress> {
    (1..=ROWS).flat_map(|row| {
        (1..=WEEKS).flat_map(move |week| {
            (1..=COLS_PER_WEEK).map(move |col| CellAddress {
                row,
                week: Some(week),
                col,
            })
        })
    })
}

/// Every chassis-base address in row, column order.
pub fn chassis_addresses() -> impl Iterator<Item = CellAddress> {
    (1..=ROWS).flat_map(|row| {
        (1..=CHASSIS_COLS).map(move |col| CellAddress {
            row,
            week: None,
            col,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_shapes() {
        assert_eq!(CellAddress::grid(1, 1, 1).unwrap().key().as_str(), "1-1-1");
        assert_eq!(CellAddress::grid(30, 12, 3).unwrap().key().as_str(), "30-12-3");
        assert_eq!(CellAddress::chassis(7, 2).unwrap().key().as_str(), "7-2");
    }

    #[test]
    fn decode_rejects_foreign_shapes() {
        for bad in [
            "", "1", "1-", "-1", "1-1-1-1", "a-1-1", "1-x", "01-1-1", "+1-1", "1 -1", "1--1",
        ] {
            assert!(
                matches!(CellAddress::from_key(bad), Err(CoreError::MalformedKey { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn decode_rejects_out_of_range() {
        for bad in ["0-1-1", "31-1-1", "1-13-1", "1-0-1", "1-1-4", "1-4", "31-1", "1-0"] {
            assert!(
                matches!(CellAddress::from_key(bad), Err(CoreError::MalformedKey { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn constructors_check_bounds() {
        assert!(matches!(
            CellAddress::grid(31, 1, 1),
            Err(CoreError::OutOfBounds { what: "row", .. })
        ));
        assert!(matches!(
            CellAddress::chassis(1, 4),
            Err(CoreError::OutOfBounds { what: "column", .. })
        ));
    }

    #[test]
    fn address_sets_have_expected_sizes_and_no_collisions() {
        let keys: HashSet<CellKey> = main_addresses()
            .chain(chassis_addresses())
            .map(CellAddress::key)
            .collect();
        assert_eq!(keys.len(), MAIN_CELL_COUNT + CHASSIS_CELL_COUNT);
    }

    #[test]
    fn cell_key_serde_validates() {
        let key: CellKey = serde_json::from_str("\"2-3\"").unwrap();
        assert_eq!(key.address().unwrap(), CellAddress::chassis(2, 3).unwrap());
        assert!(serde_json::from_str::<CellKey>("\"2-3-9\"").is_err());
    }
}
