//! Alert record assembly and creation.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::assets::AssetResolver;
use crate::error::IngestError;
use crate::payload::AlertEvent;
use crate::store::models::{Icon, PageCreateRequest, Parent, PropertyValue};
use crate::store::StoreClient;

const NAME_PROPERTY: &str = "Name";
const GENERATED_PROPERTY: &str = "Alert Generated";
const DETAILS_PROPERTY: &str = "Details";
const METADATA_PROPERTY: &str = "Metadata";
const ASSETS_PROPERTY: &str = "Affected Assets";
const URL_PROPERTY: &str = "Related URL";

/// Icon attached to every alert record.
const ALERT_ICON_URL: &str = "https://www.notion.so/icons/bell_gray.svg";

/// Assembles alert records and submits them for creation, resolving the
/// related asset first.
#[derive(Debug, Clone)]
pub struct AlertWriter {
    store: StoreClient,
    database_id: String,
    assets: AssetResolver,
}

impl AlertWriter {
    pub fn new(store: StoreClient, database_id: impl Into<String>, assets: AssetResolver) -> Self {
        Self {
            store,
            database_id: database_id.into(),
            assets,
        }
    }

    /// Record one alert, linked to its resolved asset.
    ///
    /// Timestamp and payload validation happen before any store write. Asset
    /// resolution precedes the alert create; a failed create can still leave
    /// behind the asset record resolution produced, but never a partial
    /// alert.
    ///
    /// # Errors
    /// `InvalidTimestamp` for a malformed event time, `MalformedPayload` for
    /// details/metadata that are not valid JSON, `StoreUnavailable` for any
    /// failed store call.
    pub async fn write(&self, event: &AlertEvent) -> Result<(), IngestError> {
        let generated = crate::timestamp::normalize_event_time(&event.event_time)?;
        let details = pretty_json("detect", &event.details_raw)?;
        let metadata = pretty_json("detect_mtd", &event.metadata_raw)?;

        let asset_id = self
            .assets
            .resolve(&event.hostname, &event.internal_ip)
            .await?;

        let mut properties = BTreeMap::new();
        properties.insert(
            NAME_PROPERTY.to_string(),
            PropertyValue::title(event.name.as_str()),
        );
        properties.insert(
            GENERATED_PROPERTY.to_string(),
            PropertyValue::date(generated),
        );
        properties.insert(DETAILS_PROPERTY.to_string(), PropertyValue::rich_text(details));
        properties.insert(
            METADATA_PROPERTY.to_string(),
            PropertyValue::rich_text(metadata),
        );
        properties.insert(
            ASSETS_PROPERTY.to_string(),
            PropertyValue::relation(asset_id.as_str()),
        );
        properties.insert(
            URL_PROPERTY.to_string(),
            PropertyValue::url(event.link.as_str()),
        );

        self.store
            .create_page(&PageCreateRequest {
                parent: Parent::database(self.database_id.as_str()),
                properties,
                icon: Some(Icon::external(ALERT_ICON_URL)),
            })
            .await?;

        info!(
            name = %event.name,
            hostname = %event.hostname,
            asset_id = %asset_id,
            "Recorded alert"
        );
        Ok(())
    }
}

/// Parse `raw` as a JSON object (or `null`, for an absent sub-value) and
/// re-serialize it with stable 4-space indentation for storage as display
/// text. Scalars and arrays are rejected before any store write.
fn pretty_json(field: &'static str, raw: &str) -> Result<String, IngestError> {
    let object: Option<serde_json::Map<String, Value>> = serde_json::from_str(raw)
        .map_err(|source| IngestError::MalformedPayload { field, source })?;
    let value = object.map_or(Value::Null, Value::Object);

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| IngestError::MalformedPayload { field, source })?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_json_four_space_indent() {
        assert_eq!(
            pretty_json("detect", r#"{"a":1}"#).unwrap(),
            "{\n    \"a\": 1\n}"
        );
    }

    #[test]
    fn test_pretty_json_accepts_null() {
        // An absent detect field re-serializes to "null" upstream.
        assert_eq!(pretty_json("detect", "null").unwrap(), "null");
    }

    #[test]
    fn test_pretty_json_rejects_non_object_values() {
        // Valid JSON that is not an object is still a malformed payload.
        for raw in ["5", "[1,2]", "\"hi\"", "true"] {
            let err = pretty_json("detect", raw).unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedPayload { field: "detect", .. }),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_pretty_json_rejects_invalid_input() {
        let err = pretty_json("detect_mtd", "{not json").unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedPayload {
                field: "detect_mtd",
                ..
            }
        ));
    }

    #[test]
    fn test_pretty_json_nested_objects() {
        let text = pretty_json("detect", r#"{"a":{"b":[1,2]}}"#).unwrap();
        assert_eq!(text, "{\n    \"a\": {\n        \"b\": [\n            1,\n            2\n        ]\n    }\n}");
    }
}
