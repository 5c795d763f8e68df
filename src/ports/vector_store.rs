//! Vector store port for chunk embeddings and similarity search.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::PortError;

/// Boxed future type alias used by [`VectorStore`] to keep the trait dyn-compatible.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PortError>> + Send + 'a>>;

/// Metadata stored with every indexed chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkPayload {
    /// Path relative to the project root.
    pub path: String,
    /// Architectural layer (`Domain`, `API`, `Frontend`, ...).
    pub layer: String,
    /// File kind (`Entity`, `Controller`, `Hook`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Chunk text.
    pub content: String,
    /// Position of the chunk within its file.
    pub chunk_index: usize,
}

impl ChunkPayload {
    /// Returns the payload field addressed by a filter key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            "path" => Some(&self.path),
            "layer" => Some(&self.layer),
            "type" => Some(&self.kind),
            "content" => Some(&self.content),
            _ => None,
        }
    }
}

/// A vector with its id and payload, ready for upsert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Point {
    /// UUID string.
    pub id: String,
    /// Embedding.
    pub vector: Vec<f32>,
    /// Chunk metadata.
    pub payload: ChunkPayload,
}

/// A search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredPoint {
    /// Cosine similarity.
    pub score: f32,
    /// Chunk metadata.
    pub payload: ChunkPayload,
}

/// Value a [`FieldCondition`] matches against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchValue {
    /// Field equals this value.
    Value(String),
    /// Field equals any of these values.
    Any(Vec<String>),
}

/// One `must` clause of a [`PayloadFilter`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldCondition {
    /// Payload key.
    pub key: String,
    /// Accepted value(s).
    #[serde(rename = "match")]
    pub matches: MatchValue,
}

impl FieldCondition {
    /// `key == value`.
    #[must_use]
    pub fn equals(key: &str, value: &str) -> Self {
        Self { key: key.to_string(), matches: MatchValue::Value(value.to_string()) }
    }

    /// `key` is one of `values`.
    #[must_use]
    pub fn any_of(key: &str, values: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            matches: MatchValue::Any(values.iter().map(ToString::to_string).collect()),
        }
    }
}

/// Conjunction of payload conditions. Serializes as a Qdrant filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayloadFilter {
    /// Conditions that must all hold.
    pub must: Vec<FieldCondition>,
}

impl PayloadFilter {
    /// Adds a condition.
    #[must_use]
    pub fn with(mut self, condition: FieldCondition) -> Self {
        self.must.push(condition);
        self
    }

    /// Returns `true` if `payload` satisfies every condition.
    #[must_use]
    pub fn matches(&self, payload: &ChunkPayload) -> bool {
        self.must.iter().all(|condition| {
            let Some(field) = payload.field(&condition.key) else {
                return false;
            };
            match &condition.matches {
                MatchValue::Value(value) => field == value,
                MatchValue::Any(values) => values.iter().any(|value| value == field),
            }
        })
    }
}

/// A similarity query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Query embedding.
    pub vector: Vec<f32>,
    /// Optional payload filter.
    pub filter: Option<PayloadFilter>,
    /// Maximum number of hits.
    pub limit: usize,
    /// Minimum score, when set.
    pub score_threshold: Option<f32>,
}

/// Stores chunk vectors in one named collection.
pub trait VectorStore: Send + Sync {
    /// Drops the collection if present and creates it empty with cosine
    /// distance and the given vector size.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the request.
    fn recreate_collection(&self, vector_size: usize) -> StoreFuture<'_, ()>;

    /// Returns `true` if the collection exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn collection_exists(&self) -> StoreFuture<'_, bool>;

    /// Inserts or replaces points by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the batch.
    fn upsert(&self, points: Vec<Point>) -> StoreFuture<'_, ()>;

    /// Returns the best-scoring points, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the query.
    fn search(&self, request: SearchRequest) -> StoreFuture<'_, Vec<ScoredPoint>>;

    /// Returns up to `limit` payloads matching `filter`, in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn scroll(&self, filter: PayloadFilter, limit: usize) -> StoreFuture<'_, Vec<ChunkPayload>>;

    /// Deletes every point whose payload `path` equals `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    fn delete_by_path(&self, path: &str) -> StoreFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(layer: &str, kind: &str) -> ChunkPayload {
        ChunkPayload {
            path: "src/Koinon.Api/Controllers/PeopleController.cs".to_string(),
            layer: layer.to_string(),
            kind: kind.to_string(),
            content: "public class PeopleController".to_string(),
            chunk_index: 0,
        }
    }

    #[test]
    fn filter_serializes_as_qdrant_must_clause() {
        let filter = PayloadFilter::default()
            .with(FieldCondition::equals("layer", "API"))
            .with(FieldCondition::any_of("type", &["Entity", "DTO"]));
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"must": [
                {"key": "layer", "match": {"value": "API"}},
                {"key": "type", "match": {"any": ["Entity", "DTO"]}}
            ]})
        );
    }

    #[test]
    fn filter_requires_every_condition() {
        let filter = PayloadFilter::default()
            .with(FieldCondition::equals("layer", "API"))
            .with(FieldCondition::equals("type", "Controller"));
        assert!(filter.matches(&payload("API", "Controller")));
        assert!(!filter.matches(&payload("API", "Other")));
        assert!(PayloadFilter::default().matches(&payload("Domain", "Entity")));
    }

    #[test]
    fn unknown_filter_key_never_matches() {
        let filter = PayloadFilter::default().with(FieldCondition::equals("owner", "x"));
        assert!(!filter.matches(&payload("API", "Controller")));
    }
}
