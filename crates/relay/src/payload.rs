//! Defensive extraction of alert fields from a webhook body.

use serde_json::Value;

/// Fields pulled from one webhook payload.
///
/// Extraction never fails on an absent or mistyped field; each scalar field
/// degrades to an empty string instead. A bad event time therefore surfaces
/// later, from the Alert Writer's timestamp normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    /// Alert name/category (`cat`).
    pub name: String,
    /// Event time in epoch milliseconds (`routing.event_time`), kept as the
    /// raw numeric string.
    pub event_time: String,
    /// Host the alert concerns (`routing.hostname`).
    pub hostname: String,
    /// Internal IP of the host (`routing.int_ip`).
    pub internal_ip: String,
    /// Reference URL (`link`).
    pub link: String,
    /// Detection details (`detect`), re-serialized to JSON text.
    pub details_raw: String,
    /// Detection metadata (`detect_mtd`), re-serialized to JSON text.
    pub metadata_raw: String,
}

impl AlertEvent {
    /// Extract an event from a decoded webhook body.
    ///
    /// The `detect` and `detect_mtd` sub-values are re-serialized
    /// unconditionally; an absent sub-value serializes as `null`.
    ///
    /// # Errors
    /// Returns error only if re-serialization fails, which is unreachable in
    /// practice for JSON-decoded input.
    pub fn from_value(body: &Value) -> Result<Self, serde_json::Error> {
        let routing = body.get("routing");

        // Numeric event times arrive as JSON numbers; float values truncate
        // toward zero.
        let event_time = routing
            .and_then(|r| r.get("event_time"))
            .and_then(Value::as_f64)
            .map(|v| format!("{}", v as i64))
            .unwrap_or_default();

        Ok(Self {
            name: string_field(body, "cat"),
            event_time,
            hostname: routing.map(|r| string_field(r, "hostname")).unwrap_or_default(),
            internal_ip: routing.map(|r| string_field(r, "int_ip")).unwrap_or_default(),
            link: string_field(body, "link"),
            details_raw: serde_json::to_string(body.get("detect").unwrap_or(&Value::Null))?,
            metadata_raw: serde_json::to_string(body.get("detect_mtd").unwrap_or(&Value::Null))?,
        })
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let body = json!({
            "cat": "Malware",
            "link": "http://x",
            "routing": {
                "event_time": 1_700_000_000_000_i64,
                "hostname": "host1",
                "int_ip": "10.0.0.5"
            },
            "detect": { "a": 1 },
            "detect_mtd": { "b": 2 }
        });

        let event = AlertEvent::from_value(&body).unwrap();
        assert_eq!(event.name, "Malware");
        assert_eq!(event.event_time, "1700000000000");
        assert_eq!(event.hostname, "host1");
        assert_eq!(event.internal_ip, "10.0.0.5");
        assert_eq!(event.link, "http://x");
        assert_eq!(event.details_raw, r#"{"a":1}"#);
        assert_eq!(event.metadata_raw, r#"{"b":2}"#);
    }

    #[test]
    fn test_missing_link_degrades_to_empty() {
        let body = json!({
            "cat": "Malware",
            "routing": { "event_time": 1_700_000_000_000_i64, "hostname": "host1" }
        });

        let event = AlertEvent::from_value(&body).unwrap();
        assert_eq!(event.link, "");
        assert_eq!(event.internal_ip, "");
    }

    #[test]
    fn test_missing_routing_degrades_to_empty() {
        let event = AlertEvent::from_value(&json!({ "cat": "Malware" })).unwrap();
        assert_eq!(event.event_time, "");
        assert_eq!(event.hostname, "");
        assert_eq!(event.internal_ip, "");
    }

    #[test]
    fn test_mistyped_fields_degrade_to_empty() {
        let body = json!({
            "cat": 7,
            "link": ["not", "a", "string"],
            "routing": { "event_time": "not-a-number", "hostname": 42 }
        });

        let event = AlertEvent::from_value(&body).unwrap();
        assert_eq!(event.name, "");
        assert_eq!(event.link, "");
        assert_eq!(event.event_time, "");
        assert_eq!(event.hostname, "");
    }

    #[test]
    fn test_fractional_event_time_truncates() {
        let body = json!({ "routing": { "event_time": 1_700_000_000_000.9_f64 } });
        let event = AlertEvent::from_value(&body).unwrap();
        assert_eq!(event.event_time, "1700000000000");
    }

    #[test]
    fn test_absent_detect_serializes_as_null() {
        let event = AlertEvent::from_value(&json!({})).unwrap();
        assert_eq!(event.details_raw, "null");
        assert_eq!(event.metadata_raw, "null");
    }
}
