//! Parser trait and implementations for vending transaction exports

mod delimited;
mod events;
pub mod grid;
mod workbook;

pub use delimited::{DelimitedParser, Delimiter};
pub use events::{event_to_record, parse_events, records_from_events, DropReason, EventsParser};
pub use grid::{parse_grid, Cell, REQUIRED_HEADERS};
pub use workbook::WorkbookParser;

use crate::types::{ConsumptionRecord, Result};
use std::path::Path;

/// Trait for parsing transaction records from one input format
pub trait RecordParser: Send + Sync {
    /// Parser name (e.g., "workbook")
    fn name(&self) -> &str;

    /// Lowercase file extensions this parser handles
    fn extensions(&self) -> &[&str];

    /// Parse a single file. All-or-nothing for tabular input.
    fn parse_file(&self, path: &Path) -> Result<Vec<ConsumptionRecord>>;

    /// Whether this parser claims the given path by extension
    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

/// Registry of available parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn RecordParser>>,
    fallback: DelimitedParser,
}

impl ParserRegistry {
    /// Create a new registry with default parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(WorkbookParser::new()),
                Box::new(DelimitedParser::new()),
                Box::new(EventsParser::new()),
            ],
            fallback: DelimitedParser::new(),
        }
    }

    /// Get all registered parsers
    pub fn parsers(&self) -> &[Box<dyn RecordParser>] {
        &self.parsers
    }

    /// Find a parser by name
    pub fn get(&self, name: &str) -> Option<&dyn RecordParser> {
        self.parsers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Pick the parser for a path; unknown extensions are read as delimited text
    pub fn for_path(&self, path: &Path) -> &dyn RecordParser {
        self.parsers
            .iter()
            .find(|p| p.handles(path))
            .map(|p| p.as_ref())
            .unwrap_or(&self.fallback)
    }

    /// Parse a file with the parser chosen for its extension
    pub fn parse_file(&self, path: &Path) -> Result<Vec<ConsumptionRecord>> {
        let parser = self.for_path(path);
        tracing::debug!(parser = parser.name(), path = %path.display(), "parsing file");
        parser.parse_file(path)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
