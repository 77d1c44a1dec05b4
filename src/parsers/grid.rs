//! Header-driven grid validation shared by every input format
//!
//! A grid is a list of rows of raw cells where the first row is the header.
//! Columns are located by header name, so their order in the source does not
//! matter. Validation is all-or-nothing: the first bad row aborts the parse.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::debug;

use crate::types::{ConsumptionRecord, Result, RowField, VendError};

/// Event time column
pub const HEADER_TIME: &str = "事件時間";
/// Face-recognition ID column (becomes `user_id`)
pub const HEADER_USER_ID: &str = "人臉辨識ID";
/// User display name column
pub const HEADER_USER_NAME: &str = "使用者名稱";
/// Item name column
pub const HEADER_ITEM: &str = "品名";
/// Amount column
pub const HEADER_AMOUNT: &str = "金額";

/// Required headers in reporting order
pub const REQUIRED_HEADERS: [&str; 5] = [
    HEADER_TIME,
    HEADER_USER_ID,
    HEADER_USER_NAME,
    HEADER_ITEM,
    HEADER_AMOUNT,
];

/// Naive date-time layouts accepted in text cells (local time)
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts (local midnight)
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// A raw cell value as read from a workbook, text line or JSON field
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Blank cells are empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Coerce to the string a user would see in the source
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number_cell(*n),
            Self::Bool(b) => b.to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }
}

/// Integral numbers print without a fractional part ("362", not "362.0")
fn format_number_cell(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Parse an amount cell into a finite number
pub fn parse_amount(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Parse a timestamp cell; naive values are taken as local time
pub fn parse_timestamp(cell: &Cell) -> Option<DateTime<Utc>> {
    match cell {
        Cell::DateTime(naive) => local_to_utc(naive),
        Cell::Text(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Parse a timestamp string (RFC 3339 or one of the naive layouts)
pub fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return local_to_utc(&naive);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).and_then(|n| local_to_utc(&n));
        }
    }

    None
}

/// Resolve a local wall-clock time. Times inside a DST gap shift forward an hour.
fn local_to_utc(naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(naive)
        .earliest()
        .or_else(|| {
            Local
                .from_local_datetime(&(*naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Column positions resolved from the header row
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnMap {
    time: usize,
    user_id: usize,
    user_name: usize,
    item: usize,
    amount: usize,
}

impl ColumnMap {
    /// Locate every required header, reporting all that are missing
    pub(crate) fn from_header(header: &[Cell]) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|c| c.to_text().trim().to_string()).collect();
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let missing: Vec<String> = REQUIRED_HEADERS
            .iter()
            .copied()
            .filter(|&h| find(h).is_none())
            .map(|h| h.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(VendError::MissingHeader(missing));
        }

        // All present: checked above
        let index = |wanted: &str| find(wanted).unwrap_or_default();
        Ok(Self {
            time: index(HEADER_TIME),
            user_id: index(HEADER_USER_ID),
            user_name: index(HEADER_USER_NAME),
            item: index(HEADER_ITEM),
            amount: index(HEADER_AMOUNT),
        })
    }

    /// Validate one data row. `row_number` is the 1-based display row.
    pub(crate) fn record(&self, row: &[Cell], row_number: usize) -> Result<ConsumptionRecord> {
        let cell = |idx: usize| row.get(idx).unwrap_or(&Cell::Empty);

        let amount_cell = cell(self.amount);
        let price = parse_amount(amount_cell).ok_or_else(|| VendError::RowParse {
            row: row_number,
            field: RowField::Amount,
            value: amount_cell.to_text(),
        })?;

        let time_cell = cell(self.time);
        let timestamp = parse_timestamp(time_cell).ok_or_else(|| VendError::RowParse {
            row: row_number,
            field: RowField::Timestamp,
            value: time_cell.to_text(),
        })?;

        Ok(ConsumptionRecord {
            timestamp,
            user_id: cell(self.user_id).to_text(),
            user_name: cell(self.user_name).to_text(),
            beverage_name: cell(self.item).to_text(),
            price,
        })
    }
}

/// Parse a header-led grid into records
pub fn parse_grid(rows: &[Vec<Cell>]) -> Result<Vec<ConsumptionRecord>> {
    if rows.len() <= 1 {
        return Err(VendError::EmptyInput);
    }

    let columns = ColumnMap::from_header(&rows[0])?;

    let mut records = Vec::with_capacity(rows.len() - 1);
    for (index, row) in rows.iter().enumerate().skip(1) {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        // Header is row 1
        records.push(columns.record(row, index + 1)?);
    }

    debug!(
        rows = rows.len() - 1,
        records = records.len(),
        "parsed grid"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::from(*s)).collect()
    }

    fn header() -> Vec<Cell> {
        text_row(&["事件時間", "人臉辨識ID", "使用者名稱", "品名", "金額"])
    }

    #[test]
    fn test_single_row_scenario() {
        let rows = vec![
            header(),
            text_row(&["2025-10-23 18:02:36", "362", "Ming Lin", "八寶粥", "25"]),
        ];

        let records = parse_grid(&rows).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, 25.0);
        assert_eq!(records[0].user_id, "362");
        assert_eq!(records[0].user_name, "Ming Lin");
        assert_eq!(records[0].beverage_name, "八寶粥");
        assert_eq!(records[0].local_hour(), 18);
    }

    #[test]
    fn test_invalid_amount_reports_row_two() {
        let rows = vec![
            header(),
            text_row(&["2025-10-23 18:02:36", "362", "Ming Lin", "八寶粥", "abc"]),
        ];

        let err = parse_grid(&rows).unwrap_err();
        match err {
            VendError::RowParse { row, field, value } => {
                assert_eq!(row, 2);
                assert_eq!(field, RowField::Amount);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_timestamp_row_number_counts_header() {
        let rows = vec![
            header(),
            text_row(&["2025-10-23 18:02:36", "362", "Ming Lin", "八寶粥", "25"]),
            text_row(&["yesterday", "363", "Amy", "可樂", "20"]),
        ];

        let err = parse_grid(&rows).unwrap_err();
        assert!(matches!(
            err,
            VendError::RowParse {
                row: 3,
                field: RowField::Timestamp,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_headers_lists_all() {
        let rows = vec![
            text_row(&["事件時間", "使用者名稱", "金額"]),
            text_row(&["2025-10-23 18:02:36", "Ming Lin", "25"]),
        ];

        let err = parse_grid(&rows).unwrap_err();
        match err {
            VendError::MissingHeader(missing) => {
                assert_eq!(missing, vec!["人臉辨識ID".to_string(), "品名".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_headers_checked_before_rows() {
        // Bad amount would fail too, but the header check comes first
        let rows = vec![text_row(&["金額"]), text_row(&["abc"])];
        assert!(matches!(
            parse_grid(&rows),
            Err(VendError::MissingHeader(_))
        ));
    }

    #[test]
    fn test_header_only_is_empty_input() {
        assert!(matches!(parse_grid(&[header()]), Err(VendError::EmptyInput)));
        assert!(matches!(parse_grid(&[]), Err(VendError::EmptyInput)));
    }

    #[test]
    fn test_header_order_independent_and_trimmed() {
        let rows = vec![
            text_row(&[" 金額 ", "品名", "裝置名稱", "使用者名稱", "人臉辨識ID", "事件時間"]),
            text_row(&["30", "綠茶", "4F-2", "Amy", "17", "2025-10-01 09:15:00"]),
        ];

        let records = parse_grid(&rows).unwrap();
        assert_eq!(records[0].price, 30.0);
        assert_eq!(records[0].beverage_name, "綠茶");
        assert_eq!(records[0].user_id, "17");
    }

    #[test]
    fn test_blank_rows_skipped() {
        let rows = vec![
            header(),
            text_row(&["", " ", "", "", ""]),
            text_row(&["2025-10-23 18:02:36", "362", "Ming Lin", "八寶粥", "25"]),
            vec![Cell::Empty; 5],
        ];

        let records = parse_grid(&rows).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_only_blank_data_rows_is_ok_and_empty() {
        let rows = vec![header(), vec![Cell::Empty; 5]];
        assert!(parse_grid(&rows).unwrap().is_empty());
    }

    #[test]
    fn test_error_after_blank_row_keeps_grid_numbering() {
        let rows = vec![
            header(),
            vec![Cell::Empty; 5],
            text_row(&["2025-10-23 18:02:36", "362", "Ming Lin", "八寶粥", ""]),
        ];

        assert!(matches!(
            parse_grid(&rows),
            Err(VendError::RowParse { row: 3, .. })
        ));
    }

    #[test]
    fn test_numeric_cells_coerced_to_text() {
        let rows = vec![
            header(),
            vec![
                Cell::DateTime(
                    NaiveDate::from_ymd_opt(2025, 10, 23)
                        .unwrap()
                        .and_hms_opt(12, 30, 0)
                        .unwrap(),
                ),
                Cell::Number(362.0),
                Cell::Text("Ming Lin".into()),
                Cell::Text("八寶粥".into()),
                Cell::Number(25.0),
            ],
        ];

        let records = parse_grid(&rows).unwrap();
        assert_eq!(records[0].user_id, "362");
        assert_eq!(records[0].price, 25.0);
        assert_eq!(records[0].local_hour(), 12);
    }

    #[test]
    fn test_short_row_treated_as_missing_cells() {
        let rows = vec![header(), text_row(&["2025-10-23 18:02:36", "362"])];
        assert!(matches!(
            parse_grid(&rows),
            Err(VendError::RowParse {
                row: 2,
                field: RowField::Amount,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount(&Cell::Number(25.0)), Some(25.0));
        assert_eq!(parse_amount(&Cell::Text(" 12.5 ".into())), Some(12.5));
        assert_eq!(parse_amount(&Cell::Text("-5".into())), Some(-5.0));
        assert_eq!(parse_amount(&Cell::Text("abc".into())), None);
        assert_eq!(parse_amount(&Cell::Text("inf".into())), None);
        assert_eq!(parse_amount(&Cell::Text("NaN".into())), None);
        assert_eq!(parse_amount(&Cell::Empty), None);
        assert_eq!(parse_amount(&Cell::Bool(true)), None);
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        for s in [
            "2025-10-23 18:02:36",
            "2025-10-23T18:02:36",
            "2025/10/23 18:02:36",
            "2025-10-23 18:02:36.250",
            "2025-10-23 18:02",
        ] {
            let ts = parse_timestamp_str(s).unwrap_or_else(|| panic!("failed: {s}"));
            assert_eq!(ts.with_timezone(&Local).hour(), 18, "{s}");
        }
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp_str("2025-10-23T10:02:36Z").unwrap();
        assert_eq!(ts.hour(), 10);
        let ts = parse_timestamp_str("2025-10-23T18:02:36+08:00").unwrap();
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_date_only_is_local_midnight() {
        let ts = parse_timestamp_str("2025-10-23").unwrap();
        let local = ts.with_timezone(&Local);
        assert_eq!(local.hour(), 0);
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2025, 10, 23).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp_str("").is_none());
        assert!(parse_timestamp_str("not a date").is_none());
        assert!(parse_timestamp_str("2025-13-45 99:00:00").is_none());
        assert!(parse_timestamp(&Cell::Number(45000.0)).is_none());
    }

    #[test]
    fn test_cell_to_text() {
        assert_eq!(Cell::Number(362.0).to_text(), "362");
        assert_eq!(Cell::Number(2.5).to_text(), "2.5");
        assert_eq!(Cell::Bool(true).to_text(), "true");
        assert_eq!(Cell::Empty.to_text(), "");
    }
}
