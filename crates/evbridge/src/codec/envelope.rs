// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire envelope for natively typed events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{ "eventType": "<type name>", "eventData": { ... } }`
///
/// `eventType` is the Clark-notation name of a registry type
/// (`{urn:market}Quote`) or a whitelisted host primitive name
/// (`System.DateTime`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_type: String,
    #[serde(default)]
    pub event_data: Value,
}

impl EventEnvelope {
    pub fn new(event_type: impl Into<String>, event_data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            event_data,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_vec(&self, pretty: bool) -> Result<Vec<u8>, serde_json::Error> {
        if pretty {
            serde_json::to_vec_pretty(self)
        } else {
            serde_json::to_vec(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let envelope = EventEnvelope::new("System.Int32", json!(42));
        let text = String::from_utf8(envelope.to_vec(false).expect("encode")).expect("utf8");
        assert_eq!(text, r#"{"eventType":"System.Int32","eventData":42}"#);
    }

    #[test]
    fn test_missing_data_is_null() {
        let envelope = EventEnvelope::from_slice(br#"{"eventType":"System.String"}"#).expect("decode");
        assert_eq!(envelope.event_data, Value::Null);
    }

    #[test]
    fn test_missing_type_is_rejected() {
        assert!(EventEnvelope::from_slice(br#"{"eventData":{}}"#).is_err());
    }
}
