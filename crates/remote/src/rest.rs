//! Document-store adapter over a REST API.
//!
//! Speaks to a managed document service exposing collection/document
//! endpoints:
//!
//! ```text
//! POST   {base}/collections/annotations/documents        -> { "id": "..." }
//! GET    {base}/collections/annotations/documents?limit= -> { "documents": [...] }
//! GET    {base}/collections/annotations/stats            -> aggregate counts
//! DELETE {base}/collections/{name}
//! ```
//!
//! Records above the payload ceiling are rejected with a failure value
//! before any bytes go on the wire; callers down-sample masks to summary
//! statistics so this only trips on pathological payloads.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use calcmark_core::annotation::Annotation;
use calcmark_core::stats::AggregateStats;

use crate::config::REMOTE_TIMEOUT_SECS;
use crate::document::DocumentStore;
use crate::error::{RemoteError, RemoteResult};
use crate::snapshot::Collection;

/// Per-document payload ceiling (bytes). Matches the 1 MiB document limit of
/// the hosted service, minus headroom for envelope fields.
pub const MAX_DOCUMENT_BYTES: usize = 900 * 1024;

/// HTTP client for the primary document store.
pub struct RestDocumentStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SaveResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    documents: Vec<Annotation>,
}

impl RestDocumentStore {
    /// Build a client with the adapter-wide request timeout baked in.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REMOTE_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn save_annotation(&self, annotation: &Annotation) -> RemoteResult<String> {
        let body = serde_json::to_vec(annotation)
            .map_err(|e| RemoteError::Http(format!("Serialize failed: {e}")))?;
        if body.len() > MAX_DOCUMENT_BYTES {
            return Err(RemoteError::Payload(body.len(), MAX_DOCUMENT_BYTES));
        }

        let response = self
            .client
            .post(self.url("collections/annotations/documents"))
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?
            .error_for_status()
            .map_err(RemoteError::from)?;

        let saved: SaveResponse = response.json().await?;
        tracing::debug!(remote_id = %saved.id, annotation_id = %annotation.id, "Saved annotation to primary store");
        Ok(saved.id)
    }

    async fn load_all(&self, limit: i64) -> RemoteResult<Vec<Annotation>> {
        let response = self
            .client
            .get(self.url("collections/annotations/documents"))
            .header("x-api-key", &self.api_key)
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()
            .map_err(RemoteError::from)?;

        let listed: ListResponse = response.json().await?;
        Ok(listed.documents)
    }

    async fn stats(&self) -> RemoteResult<AggregateStats> {
        let response = self
            .client
            .get(self.url("collections/annotations/stats"))
            .header("x-api-key", &self.api_key)
            .send()
            .await?
            .error_for_status()
            .map_err(RemoteError::from)?;

        Ok(response.json().await?)
    }

    async fn clear(&self) -> RemoteResult<()> {
        for collection in Collection::ALL {
            self.client
                .delete(self.url(&format!("collections/{collection}")))
                .header("x-api-key", &self.api_key)
                .send()
                .await?
                .error_for_status()
                .map_err(RemoteError::from)?;
        }
        Ok(())
    }
}
