//! Consumption record and derived statistics types

use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Number of hour-of-day buckets in a histogram
pub const HOURS_PER_DAY: usize = 24;

/// One vending-machine transaction in canonical form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionRecord {
    pub timestamp: DateTime<Utc>,
    /// Face-recognition ID (file input) or `fid` (API input)
    pub user_id: String,
    pub user_name: String,
    pub beverage_name: String,
    pub price: f64,
}

impl ConsumptionRecord {
    /// Hour of day (0-23) in the local time zone
    pub fn local_hour(&self) -> usize {
        self.timestamp.with_timezone(&Local).hour() as usize
    }

    /// Local wall-clock rendering used by the record tables
    pub fn local_time_label(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

/// Credentials passed through to the vending API login endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApiCredentials {
    #[serde(rename = "projectID")]
    pub project_id: String,
    pub id: String,
    pub password: String,
}

impl ApiCredentials {
    pub fn new(
        project_id: impl Into<String>,
        id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            id: id.into(),
            password: password.into(),
        }
    }

    /// All three fields are present
    pub fn is_complete(&self) -> bool {
        !self.project_id.trim().is_empty()
            && !self.id.trim().is_empty()
            && !self.password.is_empty()
    }
}

/// Purchase count for a single item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCount {
    pub name: String,
    pub count: usize,
}

impl ItemCount {
    /// Percentage of `total` purchases this item accounts for
    pub fn share(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.count as f64 * 100.0 / total as f64
    }
}

/// Purchase count for one hour of the day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HourSlot {
    pub hour: usize,
    pub count: usize,
}

impl HourSlot {
    /// Display label, e.g. "09:00 - 09:59"
    pub fn label(&self) -> String {
        format!("{:02}:00 - {:02}:59", self.hour, self.hour)
    }
}

/// Summary statistics over a record set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AggregateStats {
    /// Plain f64 sum; amounts are small integer-like values in practice
    pub total_spent: f64,
    pub total_items: usize,
    /// Distinct `user_name` values
    pub unique_users: usize,
    /// All items ranked by count descending, first-seen order on ties
    pub item_counts: Vec<ItemCount>,
    pub top_items: Vec<ItemCount>,
    pub hourly: [usize; HOURS_PER_DAY],
    pub top_hours: Vec<HourSlot>,
}

impl AggregateStats {
    /// Most purchased item, if any
    pub fn favorite_item(&self) -> Option<&str> {
        self.top_items.first().map(|item| item.name.as_str())
    }

    /// Largest hourly bucket (0 when every bucket is empty)
    pub fn peak_hour_count(&self) -> usize {
        self.hourly.iter().copied().max().unwrap_or(0)
    }
}
