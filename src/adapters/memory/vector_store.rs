//! Vector store kept in process memory with brute-force cosine search.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::poisoned;
use crate::ports::vector_store::{
    ChunkPayload, PayloadFilter, Point, ScoredPoint, SearchRequest, StoreFuture, VectorStore,
};

#[derive(Default)]
struct Collection {
    vector_size: usize,
    points: BTreeMap<String, Point>,
}

/// In-memory vector store holding at most one collection.
#[derive(Default)]
pub struct MemoryVectorStore {
    collection: Mutex<Option<Collection>>,
}

impl MemoryVectorStore {
    /// Creates a store with no collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose collection already holds `points`.
    #[must_use]
    pub fn with_points(points: Vec<Point>) -> Self {
        let vector_size = points.first().map_or(0, |p| p.vector.len());
        let points = points.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self { collection: Mutex::new(Some(Collection { vector_size, points })) }
    }

    /// Returns the payloads currently stored, ordered by point id.
    #[must_use]
    pub fn payloads(&self) -> Vec<ChunkPayload> {
        self.collection
            .lock()
            .ok()
            .and_then(|c| c.as_ref().map(|c| c.points.values().map(|p| p.payload.clone()).collect()))
            .unwrap_or_default()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

impl VectorStore for MemoryVectorStore {
    fn recreate_collection(&self, vector_size: usize) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            *self.collection.lock().map_err(poisoned)? =
                Some(Collection { vector_size, points: BTreeMap::new() });
            Ok(())
        })
    }

    fn collection_exists(&self) -> StoreFuture<'_, bool> {
        Box::pin(async move { Ok(self.collection.lock().map_err(poisoned)?.is_some()) })
    }

    fn upsert(&self, points: Vec<Point>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut guard = self.collection.lock().map_err(poisoned)?;
            let collection = guard.as_mut().ok_or("collection does not exist")?;
            for point in points {
                if collection.vector_size != 0 && point.vector.len() != collection.vector_size {
                    return Err(format!(
                        "vector size {} does not match collection size {}",
                        point.vector.len(),
                        collection.vector_size
                    )
                    .into());
                }
                collection.points.insert(point.id.clone(), point);
            }
            Ok(())
        })
    }

    fn search(&self, request: SearchRequest) -> StoreFuture<'_, Vec<ScoredPoint>> {
        Box::pin(async move {
            let guard = self.collection.lock().map_err(poisoned)?;
            let collection = guard.as_ref().ok_or("collection does not exist")?;
            let mut hits: Vec<ScoredPoint> = collection
                .points
                .values()
                .filter(|p| request.filter.as_ref().is_none_or(|f| f.matches(&p.payload)))
                .map(|p| ScoredPoint { score: cosine(&request.vector, &p.vector), payload: p.payload.clone() })
                .filter(|hit| request.score_threshold.is_none_or(|t| hit.score >= t))
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(request.limit);
            Ok(hits)
        })
    }

    fn scroll(&self, filter: PayloadFilter, limit: usize) -> StoreFuture<'_, Vec<ChunkPayload>> {
        Box::pin(async move {
            let guard = self.collection.lock().map_err(poisoned)?;
            let collection = guard.as_ref().ok_or("collection does not exist")?;
            Ok(collection
                .points
                .values()
                .filter(|p| filter.matches(&p.payload))
                .take(limit)
                .map(|p| p.payload.clone())
                .collect())
        })
    }

    fn delete_by_path(&self, path: &str) -> StoreFuture<'_, ()> {
        let path = path.to_string();
        Box::pin(async move {
            let mut guard = self.collection.lock().map_err(poisoned)?;
            let collection = guard.as_mut().ok_or("collection does not exist")?;
            collection.points.retain(|_, p| p.payload.path != path);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::vector_store::FieldCondition;

    fn point(id: &str, path: &str, layer: &str, vector: Vec<f32>) -> Point {
        Point {
            id: id.to_string(),
            vector,
            payload: ChunkPayload {
                path: path.to_string(),
                layer: layer.to_string(),
                kind: "Other".to_string(),
                content: String::new(),
                chunk_index: 0,
            },
        }
    }

    #[tokio::test]
    async fn search_ranks_by_cosine_and_applies_filter() {
        let store = MemoryVectorStore::with_points(vec![
            point("a", "a.cs", "API", vec![1.0, 0.0]),
            point("b", "b.cs", "API", vec![0.6, 0.8]),
            point("c", "c.cs", "Domain", vec![1.0, 0.0]),
        ]);
        let hits = store
            .search(SearchRequest {
                vector: vec![1.0, 0.0],
                filter: Some(PayloadFilter::default().with(FieldCondition::equals("layer", "API"))),
                limit: 10,
                score_threshold: Some(0.5),
            })
            .await
            .unwrap();
        let paths: Vec<_> = hits.iter().map(|h| h.payload.path.as_str()).collect();
        assert_eq!(paths, vec!["a.cs", "b.cs"]);
    }

    #[tokio::test]
    async fn delete_by_path_removes_every_chunk() {
        let store = MemoryVectorStore::with_points(vec![
            point("a0", "a.cs", "API", vec![1.0]),
            point("a1", "a.cs", "API", vec![1.0]),
            point("b0", "b.cs", "API", vec![1.0]),
        ]);
        store.delete_by_path("a.cs").await.unwrap();
        assert_eq!(store.payloads().len(), 1);
    }

    #[tokio::test]
    async fn upsert_requires_collection() {
        let store = MemoryVectorStore::new();
        assert!(!store.collection_exists().await.unwrap());
        assert!(store.upsert(vec![point("a", "a.cs", "API", vec![1.0])]).await.is_err());
    }
}
