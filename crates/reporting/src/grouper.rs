//! Recipient grouping — buckets normalized events into per-recipient
//! sequences ordered by time.

use campaign_core::types::Event;
use std::collections::BTreeMap;

/// One recipient's events, sorted ascending by timestamp.
///
/// Events without a timestamp sort as if stamped at epoch 0. The sort is
/// stable, so such events keep their input order among themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientSequence {
    recipient_key: String,
    events: Vec<Event>,
}

impl RecipientSequence {
    pub fn new(recipient_key: String, mut events: Vec<Event>) -> Self {
        events.sort_by_key(|e| e.timestamp.unwrap_or(0));
        Self {
            recipient_key,
            events,
        }
    }

    pub fn recipient_key(&self) -> &str {
        &self.recipient_key
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Group events by recipient key. Keys iterate in sorted order.
pub fn group_by_recipient(events: &[Event]) -> BTreeMap<String, RecipientSequence> {
    let mut buckets: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(event.recipient_key.clone())
            .or_default()
            .push(event.clone());
    }

    buckets
        .into_iter()
        .map(|(key, events)| {
            let sequence = RecipientSequence::new(key.clone(), events);
            (key, sequence)
        })
        .collect()
}
