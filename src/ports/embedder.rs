//! Embedding port for turning text into vectors.

use std::future::Future;
use std::pin::Pin;

use super::PortError;

/// Boxed future type alias used by [`Embedder`] to keep the trait dyn-compatible.
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, PortError>> + Send + 'a>>;

/// Computes embeddings for batches of text.
pub trait Embedder: Send + Sync {
    /// Returns one vector per input, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedding service is unreachable or rejects
    /// the request.
    fn embed(&self, inputs: &[String]) -> EmbedFuture<'_>;
}
