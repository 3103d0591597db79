use crate::models::{Donor, OrganRequest, RequestStatus};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Documents requested per page when reading a whole collection
pub const PAGE_SIZE: usize = 5000;

/// Errors that can occur when interacting with the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or project")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Client for the Appwrite-compatible document store holding accounts and requests
///
/// Handles:
/// - Reading every donor and every organ request
/// - Writing request status decisions
/// - Removing donor accounts
pub struct StoreClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: StoreCollections,
    page_size: usize,
}

/// Collection IDs in the store
#[derive(Debug, Clone)]
pub struct StoreCollections {
    pub users: String,
    pub requests: String,
}

impl StoreClient {
    /// Create a new store client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: StoreCollections,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
            page_size: PAGE_SIZE,
        })
    }

    /// Override the number of documents requested per page
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            collection
        )
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(collection),
            urlencoding::encode(document_id)
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
    }

    /// Fetch every account with the donor role
    pub async fn list_donors(&self) -> Result<Vec<Donor>, StoreError> {
        let donors: Vec<Donor> = self
            .list_documents(
                &self.collections.users,
                vec![r#"equal("role", ["donor"])"#.to_string()],
            )
            .await?;

        tracing::debug!("Fetched {} donors", donors.len());
        Ok(donors)
    }

    /// Fetch every organ request regardless of status
    pub async fn list_requests(&self) -> Result<Vec<OrganRequest>, StoreError> {
        let requests: Vec<OrganRequest> = self
            .list_documents(&self.collections.requests, Vec::new())
            .await?;

        tracing::debug!("Fetched {} organ requests", requests.len());
        Ok(requests)
    }

    /// Fetch a single organ request
    pub async fn get_request(&self, request_id: &str) -> Result<OrganRequest, StoreError> {
        let url = self.document_url(&self.collections.requests, request_id);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = check_status(response, &format!("organ request {}", request_id)).await?;

        let json: Value = response.json().await?;
        decode_document(&json)
    }

    /// Persist a new status on an organ request
    pub async fn update_request_status(
        &self,
        request_id: &str,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        let url = self.document_url(&self.collections.requests, request_id);
        let payload = json!({ "data": { "status": status } });

        let response = self
            .authorized(self.client.patch(&url))
            .json(&payload)
            .send()
            .await?;
        check_status(response, &format!("organ request {}", request_id)).await?;

        tracing::info!("Request {} marked {}", request_id, status);
        Ok(())
    }

    /// Delete a donor account
    pub async fn delete_donor(&self, donor_id: &str) -> Result<(), StoreError> {
        let url = self.document_url(&self.collections.users, donor_id);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        check_status(response, &format!("donor {}", donor_id)).await?;

        tracing::info!("Deleted donor {}", donor_id);
        Ok(())
    }

    /// Health check against the configured database
    pub async fn ping(&self) -> Result<bool, StoreError> {
        let url = format!(
            "{}/databases/{}",
            self.base_url.trim_end_matches('/'),
            self.database_id
        );

        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }

    /// Read every document of a collection, following the cursor page by page
    /// until the store's reported `total` is reached
    async fn list_documents<T: DeserializeOwned>(
        &self,
        collection: &str,
        queries: Vec<String>,
    ) -> Result<Vec<T>, StoreError> {
        let url = self.documents_url(collection);
        let mut records: Vec<T> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut page_queries = queries.clone();
            page_queries.push(format!("limit({})", self.page_size));
            if let Some(last_id) = &cursor {
                page_queries.push(format!("cursorAfter({})", json!(last_id)));
            }

            let params: Vec<(&str, &str)> = page_queries
                .iter()
                .map(|q| ("queries[]", q.as_str()))
                .collect();

            let response = self
                .authorized(self.client.get(&url))
                .query(&params)
                .send()
                .await?;
            let response = check_status(response, &format!("collection {}", collection)).await?;

            let json: Value = response.json().await?;

            let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0) as usize;

            let documents = json
                .get("documents")
                .and_then(|d| d.as_array())
                .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

            // One malformed record fails the whole read; skipping it would skew scoring
            for document in documents {
                records.push(decode_document::<T>(document)?);
            }

            if records.len() >= total {
                break;
            }

            if documents.len() < self.page_size {
                return Err(StoreError::InvalidResponse(format!(
                    "collection {} reports {} documents but the listing ended after {}",
                    collection,
                    total,
                    records.len()
                )));
            }

            cursor = match documents.last().and_then(document_id) {
                Some(id) => Some(id),
                None => {
                    return Err(StoreError::InvalidResponse(format!(
                        "collection {} returned a page without document ids",
                        collection
                    )))
                }
            };

            tracing::debug!(
                "Fetched {} of {} documents from {}, requesting next page",
                records.len(),
                total,
                collection
            );
        }

        Ok(records)
    }
}

fn document_id(doc: &Value) -> Option<String> {
    doc.get("$id")
        .or_else(|| doc.get("id"))
        .and_then(|id| id.as_str())
        .map(str::to_string)
}

async fn check_status(response: Response, what: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized),
        StatusCode::NOT_FOUND => Err(StoreError::NotFound(what.to_string())),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Store call for {} failed: {} - {}", what, status, body);
            Err(StoreError::ApiError(format!("{} returned {}", what, status)))
        }
    }
}

/// Lift store metadata (`$id`, `$createdAt`) into record fields when the
/// record does not carry its own.
fn normalize_document(doc: &Value) -> Value {
    let mut data = doc.get("data").unwrap_or(doc).clone();

    if let Some(fields) = data.as_object_mut() {
        for (field, meta) in [("id", "$id"), ("createdAt", "$createdAt")] {
            if fields.contains_key(field) {
                continue;
            }
            if let Some(value) = doc.get(meta) {
                fields.insert(field.to_string(), value.clone());
            }
        }
    }

    data
}

fn decode_document<T: DeserializeOwned>(doc: &Value) -> Result<T, StoreError> {
    let data = normalize_document(doc);
    let id = data
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("<unknown>")
        .to_string();

    serde_json::from_value(data)
        .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse document {}: {}", id, e)))
}
