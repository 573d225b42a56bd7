//! Suggested names for exported files.

use chrono::{Local, NaiveDate};

pub const EXPORT_FILE_STEM: &str = "capability-matrix";

/// `capability-matrix-YYYY-MM-DD.csv`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}-{}.csv", EXPORT_FILE_STEM, date.format("%Y-%m-%d"))
}

pub fn default_export_file_name() -> String {
    export_file_name(Local::now().date_naive())
}
