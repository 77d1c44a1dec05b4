//! Free-text user filter over a record set

use crate::types::ConsumptionRecord;

/// Records whose user ID or name contains `query`, case-insensitively.
/// An empty query matches nothing.
pub fn filter_records<'a>(
    records: &'a [ConsumptionRecord],
    query: &str,
) -> Vec<&'a ConsumptionRecord> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| matches(r, &needle))
        .collect()
}

fn matches(record: &ConsumptionRecord, needle: &str) -> bool {
    record.user_id.to_lowercase().contains(needle)
        || record.user_name.to_lowercase().contains(needle)
}
