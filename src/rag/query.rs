//! Natural-language search over the code index.

use std::fmt::Write as _;

use super::{snippet, QUERY_PREFIX};
use crate::context::ServiceContext;
use crate::error::{GraphError, Result};
use crate::ports::vector_store::{ScoredPoint, SearchRequest};

/// Hits returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

const SNIPPET_CHARS: usize = 150;

/// Embeds `text` as a search query and returns the closest chunks.
///
/// # Errors
///
/// Returns [`GraphError::Remote`] if embedding or search fails.
pub async fn query(ctx: &ServiceContext, text: &str, limit: usize) -> Result<Vec<ScoredPoint>> {
    let vector = embed_query(ctx, text).await?;
    ctx.vector_store
        .search(SearchRequest { vector, filter: None, limit, score_threshold: None })
        .await
        .map_err(|e| GraphError::remote("search", e))
}

/// Embeds one query string with the query prefix.
pub(crate) async fn embed_query(ctx: &ServiceContext, text: &str) -> Result<Vec<f32>> {
    let mut vectors = ctx
        .embedder
        .embed(&[format!("{QUERY_PREFIX}{text}")])
        .await
        .map_err(|e| GraphError::remote("embed query", e))?;
    vectors.pop().ok_or_else(|| GraphError::Remote("embedding service returned no vector".to_string()))
}

/// Renders hits for the terminal.
#[must_use]
pub fn format_hits(text: &str, hits: &[ScoredPoint]) -> String {
    let mut out = format!("\n🔍 Query: {text}\n{}\n", "=".repeat(60));
    if hits.is_empty() {
        out.push_str("\nNo results found.\nMake sure the codebase has been indexed:\n  koinon-graph rag index\n");
        return out;
    }
    for (i, hit) in hits.iter().enumerate() {
        let payload = &hit.payload;
        let _ = writeln!(out, "\n{}. {} (score: {:.3})", i + 1, payload.path, hit.score);
        let _ = writeln!(out, "   Type: {}", payload.kind);
        let _ = writeln!(out, "   Layer: {}", payload.layer);
        let _ = writeln!(out, "   Snippet: {}...", snippet(&payload.content, SNIPPET_CHARS));
    }
    out
}
