//! Wire types for the record-store API.
//!
//! Records ("pages") live in collections ("databases") and carry a map of
//! typed properties. Only the property kinds and filter predicates this
//! service uses are modeled; everything else deserializes into the catch-all
//! variant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Plain text content inside a rich-text fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
}

/// One rich-text fragment. The store returns extra annotation fields that are
/// ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RichText {
    pub text: TextContent,
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

/// A date property value. Only the start instant is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateValue {
    pub start: DateTime<Utc>,
}

/// A reference to another page in a relation property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationRef {
    pub id: String,
}

/// A typed property value on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Title { title: Vec<RichText> },
    RichText { rich_text: Vec<RichText> },
    Date { date: DateValue },
    Url { url: String },
    Relation { relation: Vec<RelationRef> },
    /// Property kinds this service does not read.
    Other(Value),
}

impl PropertyValue {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title {
            title: vec![RichText::plain(text)],
        }
    }

    pub fn rich_text(text: impl Into<String>) -> Self {
        Self::RichText {
            rich_text: vec![RichText::plain(text)],
        }
    }

    pub fn date(start: DateTime<Utc>) -> Self {
        Self::Date {
            date: DateValue { start },
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    pub fn relation(page_id: impl Into<String>) -> Self {
        Self::Relation {
            relation: vec![RelationRef { id: page_id.into() }],
        }
    }
}

/// An external icon attached to a page on creation.
#[derive(Debug, Clone, Serialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub icon_type: &'static str,
    pub external: ExternalFile,
}

/// URL of an externally hosted file.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalFile {
    pub url: String,
}

impl Icon {
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            icon_type: "external",
            external: ExternalFile { url: url.into() },
        }
    }
}

/// Parent collection of a new page.
#[derive(Debug, Clone, Serialize)]
pub struct Parent {
    pub database_id: String,
}

impl Parent {
    pub fn database(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
        }
    }
}

/// Request body for creating a page.
#[derive(Debug, Clone, Serialize)]
pub struct PageCreateRequest {
    pub parent: Parent,
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// A page returned by the store. Only the fields this service reads are
/// modeled; response metadata is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Page {
    /// Text of the page's title property, if present. A database has at most
    /// one title property, so the property name does not matter here.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.properties.values().find_map(|value| match value {
            PropertyValue::Title { title } => {
                title.first().map(|fragment| fragment.text.content.as_str())
            }
            _ => None,
        })
    }
}

/// A query filter predicate. Predicates are AND-combinable.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Filter {
    And {
        and: Vec<Filter>,
    },
    Text {
        property: String,
        rich_text: TextCondition,
    },
    Relation {
        property: String,
        relation: RelationCondition,
    },
    CreatedTime {
        timestamp: TimestampKind,
        created_time: DateCondition,
    },
}

/// Exact-match condition on a text property.
#[derive(Debug, Clone, Serialize)]
pub struct TextCondition {
    pub equals: String,
}

/// Emptiness condition on a relation property.
#[derive(Debug, Clone, Serialize)]
pub struct RelationCondition {
    pub is_empty: bool,
}

/// Condition on a record-level timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct DateCondition {
    pub before: DateTime<Utc>,
}

/// Which record-level timestamp a filter applies to.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampKind {
    CreatedTime,
}

impl Filter {
    #[must_use]
    pub fn and(filters: Vec<Filter>) -> Self {
        Self::And { and: filters }
    }

    pub fn text_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            property: property.into(),
            rich_text: TextCondition {
                equals: value.into(),
            },
        }
    }

    pub fn relation_is_empty(property: impl Into<String>) -> Self {
        Self::Relation {
            property: property.into(),
            relation: RelationCondition { is_empty: true },
        }
    }

    #[must_use]
    pub fn created_before(instant: DateTime<Utc>) -> Self {
        Self::CreatedTime {
            timestamp: TimestampKind::CreatedTime,
            created_time: DateCondition { before: instant },
        }
    }
}

/// Request body for a database query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub filter: Filter,
}

/// One page of query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_text_equals_filter_wire_shape() {
        let filter = Filter::text_equals("Asset", "host1");
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "property": "Asset",
                "rich_text": { "equals": "host1" }
            })
        );
    }

    #[test]
    fn test_purge_filter_wire_shape() {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let filter = Filter::and(vec![
            Filter::created_before(cutoff),
            Filter::relation_is_empty("Related Incident"),
        ]);

        let value = serde_json::to_value(&filter).unwrap();
        let and = value.get("and").and_then(|v| v.as_array()).unwrap();
        assert_eq!(and.len(), 2);
        assert_eq!(and[0]["timestamp"], "created_time");
        assert!(and[0]["created_time"]["before"].is_string());
        assert_eq!(
            and[1],
            json!({
                "property": "Related Incident",
                "relation": { "is_empty": true }
            })
        );
    }

    #[test]
    fn test_property_value_serialization() {
        assert_eq!(
            serde_json::to_value(PropertyValue::title("host1")).unwrap(),
            json!({ "title": [{ "text": { "content": "host1" } }] })
        );
        assert_eq!(
            serde_json::to_value(PropertyValue::url("http://x")).unwrap(),
            json!({ "url": "http://x" })
        );
        assert_eq!(
            serde_json::to_value(PropertyValue::relation("page-1")).unwrap(),
            json!({ "relation": [{ "id": "page-1" }] })
        );
    }

    #[test]
    fn test_page_deserialization_with_extra_fields() {
        // Responses carry annotation and metadata fields this service ignores.
        let page: Page = serde_json::from_value(json!({
            "object": "page",
            "id": "page-1",
            "created_time": "2024-01-01T12:00:00.000Z",
            "archived": false,
            "properties": {
                "Name": {
                    "id": "title",
                    "type": "title",
                    "title": [{
                        "type": "text",
                        "text": { "content": "Malware", "link": null },
                        "plain_text": "Malware"
                    }]
                },
                "Priority": {
                    "id": "abc",
                    "type": "select",
                    "select": { "name": "High" }
                }
            }
        }))
        .unwrap();

        assert_eq!(page.id, "page-1");
        assert_eq!(page.title_text(), Some("Malware"));
    }

    #[test]
    fn test_page_create_request_omits_missing_icon() {
        let request = PageCreateRequest {
            parent: Parent::database("db-1"),
            properties: BTreeMap::new(),
            icon: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("icon").is_none());
        assert_eq!(value["parent"]["database_id"], "db-1");
    }
}
