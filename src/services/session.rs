//! Current data set, search query and load status
//!
//! Each ingestion replaces the whole state. Data and error are never held at
//! the same time: `Status` is either `Ready` or `Failed`, never both.

use crate::services::{filter_records, Aggregator, LoadResult};
use crate::types::{AggregateStats, ConsumptionRecord, RemoteDetail, Result};

/// Load status of the session
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    /// Nothing loaded yet (or reset)
    #[default]
    Idle,
    /// An ingestion is in flight
    Loading,
    /// Records loaded successfully
    Ready {
        label: String,
        records: Vec<ConsumptionRecord>,
    },
    /// The last ingestion failed
    Failed {
        error: String,
        detail: Option<RemoteDetail>,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    status: Status,
    query: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading)
    }

    /// Start an ingestion, dropping previous data and error together
    pub fn begin_ingest(&mut self) {
        self.status = Status::Loading;
    }

    /// Replace the state with the outcome of an ingestion
    pub fn finish_ingest(&mut self, result: Result<LoadResult>) {
        match result {
            Ok(LoadResult { label, records }) => {
                self.status = Status::Ready { label, records };
                self.query.clear();
            }
            Err(err) => {
                self.status = Status::Failed {
                    detail: err.detail().cloned(),
                    error: err.to_string(),
                };
            }
        }
    }

    /// Back to the initial state
    pub fn reset(&mut self) {
        self.status = Status::Idle;
        self.query.clear();
    }

    /// Label of the loaded data set
    pub fn label(&self) -> Option<&str> {
        match &self.status {
            Status::Ready { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Full record set (empty unless ready)
    pub fn records(&self) -> &[ConsumptionRecord] {
        match &self.status {
            Status::Ready { records, .. } => records,
            _ => &[],
        }
    }

    /// Records matching the current query
    pub fn filtered(&self) -> Vec<&ConsumptionRecord> {
        filter_records(self.records(), &self.query)
    }

    /// Statistics over every loaded record
    pub fn global_stats(&self) -> Option<AggregateStats> {
        Aggregator::summarize(self.records())
    }

    /// Statistics over the records matching the query
    pub fn query_stats(&self) -> Option<AggregateStats> {
        Aggregator::summarize(self.filtered())
    }

    /// Sorted user directory
    pub fn users(&self) -> Vec<String> {
        Aggregator::user_names(self.records())
    }
}
