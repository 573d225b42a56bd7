//! cm-csv: CSV exchange format for the capability matrix.
//!
//! Layout: one header record, then one record per matrix row:
//! `Row, ChassisBase1..3, Week <label>-1 .. Week <label>-3` for each of the
//! twelve weeks. Every field is quoted. Imports skip the header, so week
//! labels travel one way only.

pub mod codec;
pub mod error;

pub use codec::{COLUMN_COUNT, CSV_MIME_TYPE, decode, decode_bytes, encode, header_fields};
pub use error::{CsvError, CsvResult};
