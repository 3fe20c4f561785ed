//! Raw event summary — counts by reported type and the observed time range,
//! computed over the ungrouped event list.

use campaign_core::types::Event;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Earliest timestamp, epoch seconds.
    pub first: i64,
    /// Latest timestamp, epoch seconds.
    pub last: i64,
    /// Saturates at `i64::MAX` for ranges wider than an `i64`.
    pub duration_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub event_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_events: u64,
    pub unique_recipients: u64,
    /// Occurrences keyed by the raw type string.
    pub events_by_type: BTreeMap<String, u64>,
    pub time_range: Option<TimeRange>,
    /// Most frequent raw types, count descending, ties by first appearance.
    pub top_types: Vec<TypeCount>,
}

pub fn build_summary(events: &[Event], top_n: usize) -> Summary {
    // Counts in first-seen order so the top list can break ties on it.
    let mut ordered: Vec<TypeCount> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut recipients: HashSet<&str> = HashSet::new();
    let mut range: Option<(i64, i64)> = None;

    for event in events {
        match position.get(event.raw_type.as_str()).copied() {
            Some(i) => ordered[i].count += 1,
            None => {
                position.insert(event.raw_type.as_str(), ordered.len());
                ordered.push(TypeCount {
                    event_type: event.raw_type.clone(),
                    count: 1,
                });
            }
        }
        recipients.insert(event.recipient_key.as_str());
        if let Some(ts) = event.timestamp {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
                None => (ts, ts),
            });
        }
    }

    let events_by_type = ordered
        .iter()
        .map(|t| (t.event_type.clone(), t.count))
        .collect();

    // Stable sort keeps first-seen order among equal counts.
    let mut top_types = ordered;
    top_types.sort_by(|a, b| b.count.cmp(&a.count));
    top_types.truncate(top_n);

    Summary {
        total_events: events.len() as u64,
        unique_recipients: recipients.len() as u64,
        events_by_type,
        time_range: range.map(|(first, last)| TimeRange {
            first,
            last,
            duration_secs: last.saturating_sub(first),
        }),
        top_types,
    }
}
