//! REST client for the hosted record store.

pub mod models;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::StoreError;
use models::{Page, PageCreateRequest, QueryRequest, QueryResponse};

/// Hosted API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.notion.com";

/// API version pinned for every request.
const API_VERSION: &str = "2022-06-28";

/// Record-store API client.
///
/// All calls block the calling task until the remote response arrives; no
/// timeout is set beyond the transport defaults and nothing is retried.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a client against the hosted endpoint.
    ///
    /// # Errors
    /// Returns error if the auth token is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Create a client against a specific base URL.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).context("Invalid API token")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(API_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Query a collection with a filter, returning one page of results.
    pub async fn query_database(
        &self,
        database_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, StoreError> {
        let url = format!("{}/v1/databases/{database_id}/query", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let result: QueryResponse = Self::decode(response).await?;
        debug!(
            database_id = %database_id,
            count = result.results.len(),
            has_more = result.has_more,
            "Queried collection"
        );
        Ok(result)
    }

    /// Create a record from a typed property map.
    pub async fn create_page(&self, request: &PageCreateRequest) -> Result<Page, StoreError> {
        let url = format!("{}/v1/pages", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let page: Page = Self::decode(response).await?;
        debug!(page_id = %page.id, "Created record");
        Ok(page)
    }

    /// Soft-delete a record by setting its archived flag.
    pub async fn archive_page(&self, page_id: &str) -> Result<(), StoreError> {
        let url = format!("{}/v1/pages/{page_id}", self.base_url);
        let response = self
            .client
            .patch(&url)
            .json(&json!({ "archived": true }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        Ok(())
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}
