//! Asset lookup-or-create against the asset collection.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::IngestError;
use crate::store::models::{Filter, Icon, PageCreateRequest, Parent, PropertyValue, QueryRequest};
use crate::store::StoreClient;

/// Title property holding the host name, used as the natural key.
const ASSET_TITLE_PROPERTY: &str = "Asset";

/// Text property holding the host's internal IP.
const ASSET_IP_PROPERTY: &str = "Asset IP Address";

/// Icon attached to every asset record.
const ASSET_ICON_URL: &str = "https://www.notion.so/icons/computer-chip_gray.svg";

/// Resolves a host name to an asset record, creating the record on first
/// sight.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    store: StoreClient,
    database_id: String,
}

impl AssetResolver {
    pub fn new(store: StoreClient, database_id: impl Into<String>) -> Self {
        Self {
            store,
            database_id: database_id.into(),
        }
    }

    /// Return the ID of the asset record for `hostname`, creating one with
    /// `internal_ip` when no match exists.
    ///
    /// The lookup is an exact, case-sensitive match on the asset title; when
    /// the store returns several matches the first wins. Concurrent first
    /// sightings of the same hostname can both take the create branch and
    /// leave duplicate records; there is no locking here.
    ///
    /// # Errors
    /// Returns `StoreUnavailable` if the query or the create call fails.
    pub async fn resolve(&self, hostname: &str, internal_ip: &str) -> Result<String, IngestError> {
        let query = QueryRequest {
            filter: Filter::text_equals(ASSET_TITLE_PROPERTY, hostname),
        };
        let response = self.store.query_database(&self.database_id, &query).await?;

        if let Some(page) = response.results.into_iter().next() {
            debug!(hostname = %hostname, asset_id = %page.id, "Found existing asset");
            return Ok(page.id);
        }

        let mut properties = BTreeMap::new();
        properties.insert(
            ASSET_TITLE_PROPERTY.to_string(),
            PropertyValue::title(hostname),
        );
        properties.insert(
            ASSET_IP_PROPERTY.to_string(),
            PropertyValue::rich_text(internal_ip),
        );

        let page = self
            .store
            .create_page(&PageCreateRequest {
                parent: Parent::database(self.database_id.as_str()),
                properties,
                icon: Some(Icon::external(ASSET_ICON_URL)),
            })
            .await?;

        info!(hostname = %hostname, asset_id = %page.id, "Created asset record");
        Ok(page.id)
    }
}
