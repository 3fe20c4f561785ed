use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Recipient key used when a record carries neither an email nor a contact id.
/// All such records collapse into a single bucket.
pub const UNKNOWN_RECIPIENT: &str = "unknown";

/// Raw type recorded for events whose record has no usable `type` field.
pub const UNKNOWN_EVENT_TYPE: &str = "unknown";

/// One record as supplied by the campaign event log source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawEvent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<Value>,
    /// Everything else on the record (click URL, user agent, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawEvent {
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: Some(Value::String(event_type.to_string())),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_contact_id(mut self, contact_id: &str) -> Self {
        self.contact_id = Some(Value::String(contact_id.to_string()));
        self
    }

    pub fn with_time(mut self, epoch_secs: i64) -> Self {
        self.time = Some(Value::from(epoch_secs));
        self
    }

    /// The record's type string, if it has one.
    pub fn type_str(&self) -> Option<&str> {
        self.event_type.as_ref().and_then(Value::as_str)
    }

    /// Epoch seconds from `time`, falling back to `timestamp`. Fractional
    /// seconds are truncated; unparseable values count as absent.
    pub fn epoch_secs(&self) -> Option<i64> {
        self.time
            .as_ref()
            .and_then(epoch_from_value)
            .or_else(|| self.timestamp.as_ref().and_then(epoch_from_value))
    }

    /// Recipient identity: non-empty email, then contact id, then [`UNKNOWN_RECIPIENT`].
    pub fn recipient_key(&self) -> String {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            return email.to_string();
        }
        match &self.contact_id {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => UNKNOWN_RECIPIENT.to_string(),
        }
    }
}

fn epoch_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// Closed classification of an event's raw type string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Sent,
    Delivered,
    Opened,
    Clicked,
    Bounced,
    Unsubscribed,
    /// Anything the mapping table does not name. Counted in the raw summary only.
    Other,
}

impl EventKind {
    /// The six kinds that feed the funnel, in funnel order.
    pub const FUNNEL_STAGES: [EventKind; 6] = [
        EventKind::Sent,
        EventKind::Delivered,
        EventKind::Opened,
        EventKind::Clicked,
        EventKind::Bounced,
        EventKind::Unsubscribed,
    ];

    /// Case-sensitive mapping from the event log's type strings.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "sent" | "submitted" | "queued" => EventKind::Sent,
            "delivered" => EventKind::Delivered,
            "open" => EventKind::Opened,
            "click" => EventKind::Clicked,
            "bounce" => EventKind::Bounced,
            "unsubscribe" | "global_unsubscribe" => EventKind::Unsubscribed,
            _ => EventKind::Other,
        }
    }

    /// Position in [`Self::FUNNEL_STAGES`], `None` for [`EventKind::Other`].
    pub fn stage_index(self) -> Option<usize> {
        match self {
            EventKind::Sent => Some(0),
            EventKind::Delivered => Some(1),
            EventKind::Opened => Some(2),
            EventKind::Clicked => Some(3),
            EventKind::Bounced => Some(4),
            EventKind::Unsubscribed => Some(5),
            EventKind::Other => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Sent => "sent",
            EventKind::Delivered => "delivered",
            EventKind::Opened => "opened",
            EventKind::Clicked => "clicked",
            EventKind::Bounced => "bounced",
            EventKind::Unsubscribed => "unsubscribed",
            EventKind::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized campaign event. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub recipient_key: String,
    pub kind: EventKind,
    /// The type string as the event log reported it.
    pub raw_type: String,
    /// Epoch seconds.
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(recipient_key: &str, kind: EventKind, timestamp: Option<i64>) -> Self {
        Self {
            recipient_key: recipient_key.to_string(),
            kind,
            raw_type: kind.as_str().to_string(),
            timestamp,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_mapping_table() {
        assert_eq!(EventKind::from_raw("sent"), EventKind::Sent);
        assert_eq!(EventKind::from_raw("submitted"), EventKind::Sent);
        assert_eq!(EventKind::from_raw("queued"), EventKind::Sent);
        assert_eq!(EventKind::from_raw("delivered"), EventKind::Delivered);
        assert_eq!(EventKind::from_raw("open"), EventKind::Opened);
        assert_eq!(EventKind::from_raw("click"), EventKind::Clicked);
        assert_eq!(EventKind::from_raw("bounce"), EventKind::Bounced);
        assert_eq!(EventKind::from_raw("global_unsubscribe"), EventKind::Unsubscribed);
        assert_eq!(EventKind::from_raw("spam"), EventKind::Other);
        // Matching is case-sensitive.
        assert_eq!(EventKind::from_raw("Open"), EventKind::Other);
    }

    #[test]
    fn test_recipient_key_fallbacks() {
        let by_email = RawEvent::new("open").with_email("a@x.com").with_contact_id("c1");
        assert_eq!(by_email.recipient_key(), "a@x.com");

        let by_contact: RawEvent = serde_json::from_value(json!({"type": "open", "contact_id": 42})).unwrap();
        assert_eq!(by_contact.recipient_key(), "42");

        let empty_email: RawEvent =
            serde_json::from_value(json!({"type": "open", "email": "", "contact_id": "c9"})).unwrap();
        assert_eq!(empty_email.recipient_key(), "c9");

        assert_eq!(RawEvent::new("open").recipient_key(), UNKNOWN_RECIPIENT);
    }

    #[test]
    fn test_epoch_secs_variants() {
        let raw: RawEvent = serde_json::from_value(json!({"type": "open", "time": 1700000000.9})).unwrap();
        assert_eq!(raw.epoch_secs(), Some(1_700_000_000));

        let raw: RawEvent =
            serde_json::from_value(json!({"type": "open", "timestamp": "1700000123"})).unwrap();
        assert_eq!(raw.epoch_secs(), Some(1_700_000_123));

        let raw: RawEvent =
            serde_json::from_value(json!({"type": "open", "time": 5, "timestamp": 9})).unwrap();
        assert_eq!(raw.epoch_secs(), Some(5));

        let raw: RawEvent = serde_json::from_value(json!({"type": "open", "time": "soon"})).unwrap();
        assert_eq!(raw.epoch_secs(), None);
    }

    #[test]
    fn test_extra_fields_preserved() {
        let raw: RawEvent = serde_json::from_value(
            json!({"type": "click", "email": "a@x.com", "url": "https://example.com/offer"}),
        )
        .unwrap();
        assert_eq!(raw.extra.get("url"), Some(&json!("https://example.com/offer")));
        assert_eq!(raw.type_str(), Some("click"));
    }
}
