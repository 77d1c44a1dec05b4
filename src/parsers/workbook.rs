//! Spreadsheet workbook parser (first sheet, first row is the header)

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::types::{ConsumptionRecord, Result, VendError};

use super::grid::{parse_grid, Cell};
use super::RecordParser;

/// Parser for xlsx/xls/ods workbooks
pub struct WorkbookParser;

impl WorkbookParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse an in-memory workbook (e.g. an uploaded file's bytes)
    pub fn parse_bytes(&self, bytes: Vec<u8>) -> Result<Vec<ConsumptionRecord>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| VendError::Spreadsheet(e.to_string()))?;
        let rows = first_sheet_rows(&mut workbook)?;
        parse_grid(&rows)
    }
}

impl Default for WorkbookParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for WorkbookParser {
    fn name(&self) -> &str {
        "workbook"
    }

    fn extensions(&self) -> &[&str] {
        &["xlsx", "xlsm", "xls", "ods"]
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<ConsumptionRecord>> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| VendError::Spreadsheet(format!("{}: {}", path.display(), e)))?;
        let rows = first_sheet_rows(&mut workbook)?;
        debug!(path = %path.display(), rows = rows.len(), "read workbook");
        parse_grid(&rows)
    }
}

/// Read every row of the first worksheet as raw cells
fn first_sheet_rows<R, RS>(workbook: &mut R) -> Result<Vec<Vec<Cell>>>
where
    R: Reader<RS>,
    R::Error: std::fmt::Display,
    RS: Read + Seek,
{
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| VendError::Spreadsheet(e.to_string()))?,
        None => return Err(VendError::Spreadsheet("workbook has no sheets".into())),
    };

    Ok(range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect())
}

/// Map a calamine cell onto the shared cell model
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::DateTime(naive),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_data_to_cell_scalars() {
        assert_eq!(data_to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(data_to_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(
            data_to_cell(&Data::String("八寶粥".into())),
            Cell::Text("八寶粥".into())
        );
        assert_eq!(data_to_cell(&Data::Float(25.0)), Cell::Number(25.0));
        assert_eq!(data_to_cell(&Data::Int(362)), Cell::Number(362.0));
        assert_eq!(data_to_cell(&Data::Bool(true)), Cell::Bool(true));
    }

    #[test]
    fn test_iso_datetime_kept_as_text() {
        let cell = data_to_cell(&Data::DateTimeIso("2025-10-23T18:02:36".into()));
        assert_eq!(cell, Cell::Text("2025-10-23T18:02:36".into()));
    }

    #[test]
    fn test_missing_file_is_spreadsheet_error() {
        let err = WorkbookParser::new()
            .parse_file(Path::new("tests/fixtures/does-not-exist.xlsx"))
            .unwrap_err();
        assert!(matches!(err, VendError::Spreadsheet(_)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = WorkbookParser::new()
            .parse_bytes(b"definitely not a zip archive".to_vec())
            .unwrap_err();
        assert!(matches!(err, VendError::Spreadsheet(_)));
    }

    #[test]
    fn test_date_formatted_cell_becomes_datetime() {
        // 2025-10-23 18:30:00 as an Excel 1900-system serial
        let serial = 45953.0 + 18.5 / 24.0;
        let cell = data_to_cell(&Data::DateTime(ExcelDateTime::new(
            serial,
            ExcelDateTimeType::DateTime,
            false,
        )));

        let expected = NaiveDate::from_ymd_opt(2025, 10, 23)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(cell, Cell::DateTime(expected));
    }

    // ========== Workbook file tests ==========

    #[test]
    fn test_reads_first_sheet_only() {
        let records = WorkbookParser::new()
            .parse_file(&fixture("two_sheets.xlsx"))
            .unwrap();

        // The second sheet holds four archive rows that must not leak in
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.user_name != "Archive"));

        assert_eq!(records[0].user_id, "362");
        assert_eq!(records[0].user_name, "Ming Lin");
        assert_eq!(records[0].beverage_name, "八寶粥");
        assert_eq!(records[0].price, 25.0);
        assert_eq!(records[1].user_id, "17");
        assert_eq!(records[1].price, 20.0);
    }

    #[test]
    fn test_date_cells_keep_wall_clock_hour() {
        let records = WorkbookParser::new()
            .parse_file(&fixture("two_sheets.xlsx"))
            .unwrap();

        assert_eq!(records[0].local_hour(), 18);
        assert_eq!(records[0].local_time_label(), "2025-10-23 18:30:00");
        assert_eq!(records[1].local_hour(), 9);
    }

    #[test]
    fn test_bytes_match_file() {
        let path = fixture("two_sheets.xlsx");
        let from_file = WorkbookParser::new().parse_file(&path).unwrap();
        let from_bytes = WorkbookParser::new()
            .parse_bytes(std::fs::read(&path).unwrap())
            .unwrap();
        assert_eq!(from_file, from_bytes);
    }
}
