//! Parsing of event log payloads handed over by the event log source.

use crate::error::{CampaignError, CampaignResult};
use crate::types::RawEvent;
use serde_json::Value;
use tracing::debug;

/// Parse a JSON document into raw events.
///
/// The document must be an array of objects. Fields inside each object are
/// never rejected; missing or odd values degrade during normalization.
pub fn parse_event_log(json: &str) -> CampaignResult<Vec<RawEvent>> {
    let document: Value = serde_json::from_str(json)?;
    let items = match document {
        Value::Array(items) => items,
        other => {
            return Err(CampaignError::Validation(format!(
                "event log must be a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut events = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        if !item.is_object() {
            return Err(CampaignError::Validation(format!(
                "event at index {index} must be an object, got {}",
                json_kind(&item)
            )));
        }
        events.push(serde_json::from_value(item)?);
    }

    debug!(count = events.len(), "Parsed event log");
    Ok(events)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
