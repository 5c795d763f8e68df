//! Live adapter for the `VectorStore` port speaking the Qdrant REST API.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::port_error;
use crate::ports::vector_store::{
    ChunkPayload, FieldCondition, PayloadFilter, Point, ScoredPoint, SearchRequest, StoreFuture,
    VectorStore,
};
use crate::ports::PortError;

/// Vector store backed by one Qdrant collection.
pub struct QdrantStore {
    client: Client,
    base_url: String,
    collection: String,
}

impl QdrantStore {
    /// Creates a store for `collection` on the Qdrant server at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, collection: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
        }
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{suffix}", self.base_url, self.collection)
    }

    /// Sends a request and returns the status with the raw body.
    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<(StatusCode, String), PortError> {
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(|e| port_error("Qdrant request failed", e))?;
        let status = response.status();
        let text =
            response.text().await.map_err(|e| port_error("Failed to read Qdrant response", e))?;
        Ok((status, text))
    }

    /// Sends a request that must succeed and decodes its `result` field.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<T, PortError> {
        let (status, text) = self.send(method, url, body).await?;
        if !status.is_success() {
            return Err(format!("Qdrant API error ({}): {text}", status.as_u16()).into());
        }
        let envelope: QdrantResponse<T> = serde_json::from_str(&text)
            .map_err(|e| port_error("Failed to parse Qdrant response", e))?;
        Ok(envelope.result)
    }
}

/// Every Qdrant response wraps its payload in `result`.
#[derive(Deserialize)]
struct QdrantResponse<T> {
    result: T,
}

/// Search hit as returned by `points/search`.
#[derive(Deserialize)]
struct QdrantHit {
    score: f32,
    payload: ChunkPayload,
}

/// Result of `points/scroll`.
#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
}

#[derive(Deserialize)]
struct ScrollPoint {
    payload: ChunkPayload,
}

/// Body of `points/search`.
#[derive(Serialize)]
struct SearchBody<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a PayloadFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score_threshold: Option<f32>,
}

impl VectorStore for QdrantStore {
    fn recreate_collection(&self, vector_size: usize) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            // A missing collection answers 404 here, which is fine.
            let (status, text) = self.send(Method::DELETE, self.collection_url(""), None).await?;
            if !status.is_success() && status != StatusCode::NOT_FOUND {
                return Err(format!("Qdrant API error ({}): {text}", status.as_u16()).into());
            }
            let body = json!({"vectors": {"size": vector_size, "distance": "Cosine"}});
            let _: Value = self.call(Method::PUT, self.collection_url(""), Some(body)).await?;
            Ok(())
        })
    }

    fn collection_exists(&self) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let (status, text) = self.send(Method::GET, self.collection_url(""), None).await?;
            match status {
                s if s.is_success() => Ok(true),
                StatusCode::NOT_FOUND => Ok(false),
                s => Err(format!("Qdrant API error ({}): {text}", s.as_u16()).into()),
            }
        })
    }

    fn upsert(&self, points: Vec<Point>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            if points.is_empty() {
                return Ok(());
            }
            let body = json!({ "points": points });
            let _: Value =
                self.call(Method::PUT, self.collection_url("/points?wait=true"), Some(body)).await?;
            Ok(())
        })
    }

    fn search(&self, request: SearchRequest) -> StoreFuture<'_, Vec<ScoredPoint>> {
        Box::pin(async move {
            let body = SearchBody {
                vector: &request.vector,
                limit: request.limit,
                with_payload: true,
                filter: request.filter.as_ref(),
                score_threshold: request.score_threshold,
            };
            let body = serde_json::to_value(&body).map_err(|e| port_error("Invalid search body", e))?;
            let hits: Vec<QdrantHit> =
                self.call(Method::POST, self.collection_url("/points/search"), Some(body)).await?;
            Ok(hits.into_iter().map(|hit| ScoredPoint { score: hit.score, payload: hit.payload }).collect())
        })
    }

    fn scroll(&self, filter: PayloadFilter, limit: usize) -> StoreFuture<'_, Vec<ChunkPayload>> {
        Box::pin(async move {
            let body = json!({"filter": filter, "limit": limit, "with_payload": true, "with_vector": false});
            let result: ScrollResult =
                self.call(Method::POST, self.collection_url("/points/scroll"), Some(body)).await?;
            Ok(result.points.into_iter().map(|point| point.payload).collect())
        })
    }

    fn delete_by_path(&self, path: &str) -> StoreFuture<'_, ()> {
        let filter = PayloadFilter::default().with(FieldCondition::equals("path", path));
        Box::pin(async move {
            let body = json!({ "filter": filter });
            let _: Value = self
                .call(Method::POST, self.collection_url("/points/delete?wait=true"), Some(body))
                .await?;
            Ok(())
        })
    }
}
