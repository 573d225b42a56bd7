//! Encoding a store to CSV text and parsing CSV text into a [`GridPatch`].

use cm_core::{
    CHASSIS_COLS, COLS_PER_WEEK, CellAddress, GridPatch, GridStore, ROWS, WEEKS, chassis_addresses,
    main_addresses,
};
use csv::{QuoteStyle, StringRecord, Terminator};
use tracing::debug;

use crate::error::{CsvError, CsvResult};

pub const CSV_MIME_TYPE: &str = "text/csv";

const MAIN_COLS_PER_ROW: usize = WEEKS as usize * COLS_PER_WEEK as usize;

/// Row number, chassis-base block, then the week grid.
pub const COLUMN_COUNT: usize = 1 + CHASSIS_COLS as usize + MAIN_COLS_PER_ROW;

/// Records shorter than this carry no chassis-base block and are skipped.
const MIN_FIELDS: usize = 1 + CHASSIS_COLS as usize;

pub fn header_fields(store: &GridStore) -> Vec<String> {
    let mut fields = Vec::with_capacity(COLUMN_COUNT);
    fields.push("Row".to_string());
    for col in 1..=CHASSIS_COLS {
        fields.push(format!("ChassisBase{}", col));
    }
    for week in 1..=WEEKS {
        let label = store.week_label(week).unwrap_or_default();
        for col in 1..=COLS_PER_WEEK {
            fields.push(format!("Week {}-{}", label, col));
        }
    }
    fields
}

/// Serialize the whole matrix. Identical stores give byte-identical output.
pub fn encode(store: &GridStore) -> CsvResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header_fields(store))?;

    let main: Vec<CellAddress> = main_addresses().collect();
    let chassis: Vec<CellAddress> = chassis_addresses().collect();
    let rows = chassis
        .chunks(CHASSIS_COLS as usize)
        .zip(main.chunks(MAIN_COLS_PER_ROW));

    for (row, (chassis_row, main_row)) in (1..=ROWS).zip(rows) {
        let row_number = row.to_string();
        let mut record: Vec<&str> = Vec::with_capacity(COLUMN_COUNT);
        record.push(&row_number);
        record.extend(chassis_row.iter().map(|address| store.cell_at(*address)));
        record.extend(main_row.iter().map(|address| store.cell_at(*address)));
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::Output(e.error().to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::Output(e.to_string()))
}

/// Parse CSV text into a patch. See [`decode_bytes`].
pub fn decode(text: &str) -> CsvResult<GridPatch> {
    decode_bytes(text.as_bytes())
}

/// Parse raw file contents into a patch.
///
/// - the first record is the header and is skipped
/// - the `i`-th line after the header fills matrix row `i`, for `i` up to
///   [`ROWS`]; blank lines and records with fewer than four fields are
///   skipped but still use up their row
/// - empty fields are left out of the patch
///
/// The whole input is parsed before anything is returned, so a failure never
/// leaves a partial patch behind.
pub fn decode_bytes(bytes: &[u8]) -> CsvResult<GridPatch> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|e| CsvError::import_failed(e.to_string()))?,
        None => return Err(CsvError::import_failed("file has no header row")),
    };
    let header_line = record_line(&header)?;

    let mut patch = GridPatch::new();
    for record in records {
        let record = record.map_err(|e| CsvError::import_failed(e.to_string()))?;

        // The reader drops blank lines, so the row comes from the line number.
        let offset = record_line(&record)?.saturating_sub(header_line);
        if offset > u64::from(ROWS) {
            break;
        }
        let row = offset as u8;

        if record.len() < MIN_FIELDS {
            debug!(row, fields = record.len(), "skipping short CSV record");
            continue;
        }
        read_row(row, &record, &mut patch)?;
    }

    Ok(patch)
}

fn record_line(record: &StringRecord) -> CsvResult<u64> {
    record
        .position()
        .map(|position| position.line())
        .ok_or_else(|| CsvError::import_failed("record has no position"))
}

fn read_row(row: u8, record: &StringRecord, patch: &mut GridPatch) -> CsvResult<()> {
    let to_import_error = |e: cm_core::CoreError| CsvError::import_failed(e.to_string());

    for col in 1..=CHASSIS_COLS {
        let value = field(record, col as usize);
        if !value.is_empty() {
            let key = CellAddress::chassis(row, col).map_err(to_import_error)?.key();
            patch.chassis_base.insert(key, value.to_string());
        }
    }

    for week in 1..=WEEKS {
        for col in 1..=COLS_PER_WEEK {
            let value = field(record, main_field_index(week, col));
            if !value.is_empty() {
                let key = CellAddress::grid(row, week, col).map_err(to_import_error)?.key();
                patch.main_grid.insert(key, value.to_string());
            }
        }
    }
    Ok(())
}

fn main_field_index(week: u8, col: u8) -> usize {
    MIN_FIELDS + (week as usize - 1) * COLS_PER_WEEK as usize + (col as usize - 1)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::GridTarget;

    #[test]
    fn header_layout() {
        let mut store = GridStore::new();
        store.set_week_label(1, "05");
        store.set_week_label(12, "");

        let header = header_fields(&store);
        assert_eq!(header.len(), COLUMN_COUNT);
        assert_eq!(&header[..4], ["Row", "ChassisBase1", "ChassisBase2", "ChassisBase3"]);
        assert_eq!(header[4], "Week 05-1");
        assert_eq!(header[6], "Week 05-3");
        assert_eq!(header[7], "Week 02-1");
        assert_eq!(header[COLUMN_COUNT - 1], "Week -3");
    }

    #[test]
    fn encode_quotes_every_field_and_emits_all_rows() {
        let mut store = GridStore::new();
        store.set_cell(GridTarget::Chassis, "2-1", "black").unwrap();
        store.set_cell(GridTarget::Main, "2-12-3", "green").unwrap();

        let text = encode(&store).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + ROWS as usize);
        assert!(lines[0].starts_with("\"Row\",\"ChassisBase1\""));
        assert!(lines[1].starts_with("\"1\",\"\",\"\",\"\","));
        assert!(lines[2].starts_with("\"2\",\"black\",\"\",\"\","));
        assert!(lines[2].ends_with(",\"green\""));
        assert!(lines.iter().all(|line| line.split(',').count() == COLUMN_COUNT));
    }

    #[test]
    fn encode_is_deterministic() {
        let mut store = GridStore::new();
        store.set_cell(GridTarget::Main, "3-4-1", "orange").unwrap();
        assert_eq!(encode(&store).unwrap(), encode(&store.clone()).unwrap());
    }

    #[test]
    fn field_index_mapping() {
        assert_eq!(main_field_index(1, 1), 4);
        assert_eq!(main_field_index(1, 3), 6);
        assert_eq!(main_field_index(2, 1), 7);
        assert_eq!(main_field_index(12, 3), COLUMN_COUNT - 1);
    }

    #[test]
    fn decode_reads_positions_and_skips_empty_fields() {
        let text = "\"Row\"\n\"1\",\"red\",\"\",\"blue\",\"green\",\"\",\"yellow\"\n";
        let patch = decode(text).unwrap();

        assert_eq!(patch.chassis_base.len(), 2);
        assert_eq!(patch.chassis_base["1-1"], "red");
        assert_eq!(patch.chassis_base["1-3"], "blue");
        assert_eq!(patch.main_grid.len(), 2);
        assert_eq!(patch.main_grid["1-1-1"], "green");
        assert_eq!(patch.main_grid["1-1-3"], "yellow");
    }

    #[test]
    fn decode_skips_short_rows() {
        let text = "h\n\"1\",\"red\",\"\",\"\"\n\"2\",\"red\"\n\"3\",\"\",\"blue\",\"\"\n";
        let patch = decode(text).unwrap();
        let keys: Vec<String> = patch.chassis_base.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["1-1", "3-2"]);
    }

    #[test]
    fn decode_caps_rows() {
        let mut text = String::from("h\n");
        for row in 1..=40 {
            text.push_str(&format!("\"{}\",\"red\",\"\",\"\"\n", row));
        }
        let patch = decode(&text).unwrap();
        assert_eq!(patch.chassis_base.len(), ROWS as usize);
    }

    #[test]
    fn decode_ignores_extra_fields() {
        let mut fields = vec!["\"1\"".to_string(); COLUMN_COUNT + 5];
        fields[COLUMN_COUNT] = "\"red\"".to_string();
        let text = format!("h\n{}\n", fields.join(","));
        let patch = decode(&text).unwrap();
        // Every in-range field is "1"; the trailing "red" is dropped.
        assert_eq!(patch.cell_count(), CHASSIS_COLS as usize + MAIN_COLS_PER_ROW);
        assert!(patch.main_grid.values().all(|v| v == "1"));
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(matches!(decode(""), Err(CsvError::ImportFailed { .. })));
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        let bytes = b"\"Row\"\n\"1\",\"\xff\xfe\",\"\",\"\"\n";
        assert!(matches!(decode_bytes(bytes), Err(CsvError::ImportFailed { .. })));
    }

    #[test]
    fn blank_lines_use_up_their_row() {
        let text = "h\n\"1\",\"red\",\"\",\"\"\n\n\"3\",\"blue\",\"\",\"\"\n";
        let patch = decode(text).unwrap();
        let keys: Vec<String> = patch.chassis_base.keys().map(ToString::to_string).collect();
        assert_eq!(keys, ["1-1", "3-1"]);
        assert_eq!(patch.chassis_base["3-1"], "blue");
    }

    #[test]
    fn blank_lines_count_towards_the_row_cap() {
        let mut text = String::from("h\n\n");
        for row in 1..=ROWS {
            text.push_str(&format!("\"{}\",\"red\",\"\",\"\"\n", row));
        }
        let patch = decode(&text).unwrap();
        // Line 2 is blank, so every record shifts down a row and the last one
        // falls past the final row.
        assert_eq!(patch.chassis_base.len(), ROWS as usize - 1);
        assert!(!patch.chassis_base.contains_key("1-1"));
        assert!(patch.chassis_base.contains_key("30-1"));
    }

    #[test]
    fn header_labels_are_not_imported() {
        let mut store = GridStore::new();
        store.set_week_label(1, "05");
        store.set_cell(GridTarget::Main, "1-1-1", "red").unwrap();

        let mut target = GridStore::new();
        target.set_week_label(1, "40");
        target.apply_patch(&decode(&encode(&store).unwrap()).unwrap());
        assert_eq!(target.week_label(1), Some("40"));
        assert_eq!(target.week_label(2), Some("02"));
        assert_eq!(target.cell(GridTarget::Main, "1-1-1"), Some("red"));
    }

    #[test]
    fn embedded_quotes_and_commas_survive() {
        let text = "h\n\"1\",\"a \"\"quoted\"\", value\",\"\",\"\"\n";
        let patch = decode(text).unwrap();
        assert_eq!(patch.chassis_base["1-1"], "a \"quoted\", value");
    }
}
