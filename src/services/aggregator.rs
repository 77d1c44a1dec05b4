//! Aggregator service for computing consumption statistics

use crate::types::{AggregateStats, ConsumptionRecord, HourSlot, ItemCount, HOURS_PER_DAY};
use std::collections::{BTreeSet, HashMap, HashSet};

/// How many entries the top-N views keep
pub const TOP_N: usize = 3;

/// Aggregator for computing consumption statistics
pub struct Aggregator;

impl Aggregator {
    /// Summarize a record set in one forward pass. Returns `None` for no records.
    pub fn summarize<'a, I>(records: I) -> Option<AggregateStats>
    where
        I: IntoIterator<Item = &'a ConsumptionRecord>,
    {
        let mut total_spent = 0.0;
        let mut total_items = 0usize;
        let mut users: HashSet<&str> = HashSet::new();
        let mut hourly = [0usize; HOURS_PER_DAY];

        // First-seen item list plus an index into it
        let mut item_counts: Vec<ItemCount> = Vec::new();
        let mut item_index: HashMap<&str, usize> = HashMap::new();

        for record in records {
            total_spent += record.price;
            total_items += 1;
            users.insert(record.user_name.as_str());
            hourly[record.local_hour()] += 1;

            match item_index.get(record.beverage_name.as_str()) {
                Some(&idx) => item_counts[idx].count += 1,
                None => {
                    item_index.insert(record.beverage_name.as_str(), item_counts.len());
                    item_counts.push(ItemCount {
                        name: record.beverage_name.clone(),
                        count: 1,
                    });
                }
            }
        }

        if total_items == 0 {
            return None;
        }

        // Stable sort keeps first-seen order on equal counts
        item_counts.sort_by(|a, b| b.count.cmp(&a.count));
        let top_items = item_counts.iter().take(TOP_N).cloned().collect();

        Some(AggregateStats {
            total_spent,
            total_items,
            unique_users: users.len(),
            item_counts,
            top_items,
            hourly,
            top_hours: Self::top_hours(&hourly),
        })
    }

    /// Busiest non-empty hours, descending; earlier hour wins a tie
    pub fn top_hours(hourly: &[usize; HOURS_PER_DAY]) -> Vec<HourSlot> {
        let mut slots: Vec<HourSlot> = hourly
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(hour, &count)| HourSlot { hour, count })
            .collect();
        slots.sort_by(|a, b| b.count.cmp(&a.count));
        slots.truncate(TOP_N);
        slots
    }

    /// Distinct non-empty user names, sorted ascending
    pub fn user_names<'a, I>(records: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a ConsumptionRecord>,
    {
        records
            .into_iter()
            .map(|r| r.user_name.trim())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
