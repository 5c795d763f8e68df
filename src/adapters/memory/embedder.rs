//! Deterministic embedder for tests.

use std::sync::Mutex;

use super::poisoned;
use crate::ports::embedder::{EmbedFuture, Embedder};

/// Embeds text as a normalized bag of hashed words.
///
/// Texts sharing words score higher under cosine similarity, which is enough
/// to exercise ranking without a model. Every batch is recorded.
pub struct HashEmbedder {
    dims: usize,
    calls: Mutex<Vec<Vec<String>>>,
}

impl HashEmbedder {
    /// Creates an embedder producing `dims`-dimensional vectors.
    #[must_use]
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1), calls: Mutex::new(Vec::new()) }
    }

    /// Returns every batch embedded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dims];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(2_166_136_261_u32, |acc, b| (acc ^ u32::from(b)).wrapping_mul(16_777_619));
            vector[hash as usize % self.dims] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, inputs: &[String]) -> EmbedFuture<'_> {
        let inputs = inputs.to_vec();
        Box::pin(async move {
            self.calls.lock().map_err(poisoned)?.push(inputs.clone());
            Ok(inputs.iter().map(|text| self.vector(text)).collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let embedder = HashEmbedder::new(16);
        let vectors = embedder.embed(&["public class Person".to_string(), "public class Person".to_string()]).await.unwrap();
        assert_eq!(vectors[0], vectors[1]);
        assert_eq!(embedder.calls().len(), 1);
    }
}
