//! Event normalization — resolves raw event log records into typed events
//! keyed by recipient identity.

use campaign_core::types::{Event, EventKind, RawEvent, UNKNOWN_EVENT_TYPE};

/// Normalize one raw record. Unknown types become [`EventKind::Other`] and
/// records without identity fall into the shared unknown recipient bucket.
pub fn normalize(raw: &RawEvent) -> Event {
    let raw_type = raw.type_str().unwrap_or(UNKNOWN_EVENT_TYPE);
    Event {
        recipient_key: raw.recipient_key(),
        kind: EventKind::from_raw(raw_type),
        raw_type: raw_type.to_string(),
        timestamp: raw.epoch_secs(),
        extra: raw.extra.clone(),
    }
}

/// Normalize a whole event log, preserving input order.
pub fn normalize_all(raw: &[RawEvent]) -> Vec<Event> {
    raw.iter().map(normalize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::types::UNKNOWN_RECIPIENT;
    use serde_json::json;

    #[test]
    fn test_normalize_known_type() {
        let raw = RawEvent::new("queued").with_email("a@x.com").with_time(100);
        let event = normalize(&raw);
        assert_eq!(event.kind, EventKind::Sent);
        assert_eq!(event.raw_type, "queued");
        assert_eq!(event.recipient_key, "a@x.com");
        assert_eq!(event.timestamp, Some(100));
    }

    #[test]
    fn test_normalize_degrades_gracefully() {
        let raw: RawEvent = serde_json::from_value(json!({"url": "https://example.com"})).unwrap();
        let event = normalize(&raw);
        assert_eq!(event.kind, EventKind::Other);
        assert_eq!(event.raw_type, UNKNOWN_EVENT_TYPE);
        assert_eq!(event.recipient_key, UNKNOWN_RECIPIENT);
        assert_eq!(event.timestamp, None);
        assert_eq!(event.extra.get("url"), Some(&json!("https://example.com")));
    }

    #[test]
    fn test_non_string_type_is_other() {
        let raw: RawEvent = serde_json::from_value(json!({"type": 7, "email": "a@x.com"})).unwrap();
        assert_eq!(normalize(&raw).kind, EventKind::Other);
    }
}
