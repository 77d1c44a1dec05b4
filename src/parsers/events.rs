//! Vending API event conversion
//!
//! Remote data is bulk, so individual bad events are dropped with a warning
//! instead of failing the whole load. Conversion goes through the same amount
//! and timestamp validation as the grid parser.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::types::{ConsumptionRecord, Result, VendError};

use super::grid::{parse_amount, parse_timestamp_str, Cell};
use super::RecordParser;

/// Label used when an event has neither a product name nor a channel
pub const UNKNOWN_ITEM: &str = "未知品項";

/// Why an event was left out of the record set
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    NotAnObject,
    /// Channel 0 marks a non-product event
    ZeroChannel,
    InvalidTimestamp(String),
    InvalidAmount(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("event is not a JSON object"),
            Self::ZeroChannel => f.write_str("channel 0 (non-product event)"),
            Self::InvalidTimestamp(v) => write!(f, "invalid eventTime {}", v),
            Self::InvalidAmount(v) => write!(f, "non-positive or invalid amount {}", v),
        }
    }
}

/// Parse a JSON payload that must be an array of events
pub fn parse_events(bytes: &mut [u8]) -> Result<Vec<ConsumptionRecord>> {
    let value: Value = simd_json::serde::from_slice(bytes)
        .map_err(|e| VendError::Parse(format!("invalid JSON: {}", e)))?;
    match value {
        Value::Array(events) => Ok(records_from_events(&events)),
        other => Err(VendError::Parse(format!(
            "expected a JSON array of events, got {}",
            json_kind(&other)
        ))),
    }
}

/// Convert events, dropping the ones that fail validation
pub fn records_from_events(events: &[Value]) -> Vec<ConsumptionRecord> {
    let mut records = Vec::with_capacity(events.len());
    let mut dropped = 0usize;

    for (index, event) in events.iter().enumerate() {
        match event_to_record(event) {
            Ok(record) => records.push(record),
            Err(reason) => {
                dropped += 1;
                // Channel-0 events are routine, not worth a warning
                if reason == DropReason::ZeroChannel {
                    debug!(index, "skipping event: {}", reason);
                } else {
                    warn!(index, "skipping event: {}", reason);
                }
            }
        }
    }

    debug!(kept = records.len(), dropped, "converted API events");
    records
}

/// Convert a single raw event object
pub fn event_to_record(event: &Value) -> std::result::Result<ConsumptionRecord, DropReason> {
    let obj = event.as_object().ok_or(DropReason::NotAnObject)?;
    let field = |name: &str| obj.get(name).filter(|v| !v.is_null());

    let channel = field("channel");
    if channel.is_some_and(is_zero) {
        return Err(DropReason::ZeroChannel);
    }

    let time_value = field("eventTime");
    let timestamp = time_value
        .and_then(value_to_timestamp)
        .ok_or_else(|| DropReason::InvalidTimestamp(render(time_value)))?;

    let amount_value = field("amount");
    let price = amount_value
        .and_then(|v| parse_amount(&value_to_cell(v)))
        .filter(|p| *p > 0.0)
        .ok_or_else(|| DropReason::InvalidAmount(render(amount_value)))?;

    let beverage_name = match field("productName").map(value_to_text) {
        Some(name) if !name.trim().is_empty() => name,
        _ => match channel {
            Some(ch) => format!("Channel {}", value_to_text(ch)),
            None => UNKNOWN_ITEM.to_string(),
        },
    };

    Ok(ConsumptionRecord {
        timestamp,
        user_id: field("fid").map(value_to_text).unwrap_or_default(),
        user_name: field("targetUserName").map(value_to_text).unwrap_or_default(),
        beverage_name,
        price,
    })
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.trim() == "0",
        _ => false,
    }
}

/// String timestamps use the grid layouts; numbers are epoch milliseconds
fn value_to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn value_to_cell(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Empty,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Empty),
        Value::String(s) => Cell::from(s.as_str()),
        other => Cell::Text(other.to_string()),
    }
}

fn value_to_text(value: &Value) -> String {
    value_to_cell(value).to_text()
}

fn render(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_else(|| "(missing)".into())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parser for API responses saved to disk
pub struct EventsParser;

impl EventsParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EventsParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordParser for EventsParser {
    fn name(&self) -> &str {
        "api-events"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<ConsumptionRecord>> {
        let mut bytes = std::fs::read(path)?;
        parse_events(&mut bytes)
    }
}
