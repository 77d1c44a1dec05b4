//! Tab/comma-delimited text parser (exports saved as text, or pasted rows)

use std::path::Path;

use crate::types::{ConsumptionRecord, Result, VendError};

use super::grid::{parse_grid, Cell};
use super::RecordParser;

/// Cell separator for delimited text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Tab unless the first non-blank line has no tab but does have a comma
    pub fn detect(text: &str) -> Self {
        let first = text.lines().find(|line| !line.trim().is_empty());
        match first {
            Some(line) if !line.contains('\t') && line.contains(',') => Self::Comma,
            _ => Self::Tab,
        }
    }

    fn byte(self) -> u8 {
        match self {
            Self::Tab => b'\t',
            Self::Comma => b',',
        }
    }
}

/// Parser for delimited text input
pub struct DelimitedParser {
    delimiter: Option<Delimiter>,
}

impl DelimitedParser {
    /// Parser that detects the delimiter from the input
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    /// Parser with a fixed delimiter
    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Split text into a grid. Blank lines are dropped before the header is read.
    pub fn split(&self, text: &str) -> Result<Vec<Vec<Cell>>> {
        let delimiter = self.delimiter.unwrap_or_else(|| Delimiter::detect(text));

        // No quote handling: cells are split on every delimiter
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| VendError::Parse(format!("delimited text: {}", e)))?;
            let row: Vec<Cell> = record.iter().map(Cell::from).collect();
            if row.iter().all(Cell::is_blank) {
                continue;
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Parse pasted text
    pub fn parse_text(&self, text: &str) -> Result<Vec<ConsumptionRecord>> {
        let rows = self.split(text)?;
        parse_grid(&rows)
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for DelimitedParser {
    fn name(&self) -> &str {
        "delimited"
    }

    fn extensions(&self) -> &[&str] {
        &["tsv", "txt", "csv"]
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<ConsumptionRecord>> {
        let bytes = std::fs::read(path)?;
        // Strip a UTF-8 BOM left by spreadsheet exports
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        let text = std::str::from_utf8(bytes)
            .map_err(|e| VendError::Parse(format!("{} is not UTF-8 text: {}", path.display(), e)))?;
        self.parse_text(text)
    }
}
