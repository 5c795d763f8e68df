//! Full and incremental indexing of project files into the vector store.

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{chunk_file, determine_kind, determine_layer, point_id, relative_path, DOCUMENT_PREFIX};
use crate::config::RagConfig;
use crate::context::ServiceContext;
use crate::error::{GraphError, Result};
use crate::ports::vector_store::{ChunkPayload, Point};

/// Outcome of an indexing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Files considered.
    pub files: usize,
    /// Chunks written.
    pub chunks: usize,
}

fn has_indexed_extension(path: &str, rag: &RagConfig) -> bool {
    rag.extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

fn is_excluded(relative: &str, rag: &RagConfig) -> bool {
    relative.split('/').any(|part| rag.exclude_dirs.iter().any(|dir| dir == part))
}

/// Drops and recreates the collection, then indexes every matching file
/// under `root`.
///
/// # Errors
///
/// Returns [`GraphError::Remote`] if the collection cannot be recreated or
/// an upsert fails, and [`GraphError::MissingInput`] if `root` cannot be
/// walked. Unreadable files and failed embeddings are logged and skipped.
pub async fn index_project(ctx: &ServiceContext, root: &Path, rag: &RagConfig) -> Result<IndexStats> {
    info!("Recreating collection '{}'...", rag.collection);
    ctx.vector_store
        .recreate_collection(rag.vector_size)
        .await
        .map_err(|e| GraphError::remote("recreate collection", e))?;

    let files: Vec<PathBuf> = ctx
        .fs
        .walk_files(root, &rag.exclude_dirs)
        .map_err(|_| GraphError::MissingInput(root.to_path_buf()))?
        .into_iter()
        .filter(|path| has_indexed_extension(&path.to_string_lossy(), rag))
        .collect();
    info!("Found {} code files", files.len());

    let mut stats = IndexStats { files: files.len(), chunks: 0 };
    for (i, path) in files.iter().enumerate() {
        stats.chunks += index_file(ctx, root, rag, path).await?;
        if (i + 1) % 10 == 0 {
            info!("  Indexed {}/{} files ({} chunks)", i + 1, files.len(), stats.chunks);
        }
    }
    info!("Indexing complete: {} files, {} chunks in '{}'", stats.files, stats.chunks, rag.collection);
    Ok(stats)
}

/// Re-indexes files git reports as modified, added or renamed.
///
/// Each file's old points are deleted before its new chunks are written.
/// A git failure is treated as "nothing changed".
///
/// # Errors
///
/// Returns [`GraphError::Remote`] if the collection does not exist or the
/// vector store fails.
pub async fn reindex_changed(ctx: &ServiceContext, root: &Path, rag: &RagConfig) -> Result<IndexStats> {
    let exists = ctx
        .vector_store
        .collection_exists()
        .await
        .map_err(|e| GraphError::remote("check collection", e))?;
    if !exists {
        return Err(GraphError::Remote(format!(
            "collection '{}' does not exist; run `koinon-graph rag index` first",
            rag.collection
        )));
    }

    let changed = ctx.git.changed_files(root).unwrap_or_else(|e| {
        warn!("Could not list changed files: {e}");
        Vec::new()
    });
    let relevant: Vec<String> = changed
        .into_iter()
        .filter(|rel| has_indexed_extension(rel, rag) && !is_excluded(rel, rag))
        .filter(|rel| ctx.fs.exists(&root.join(rel)))
        .collect();
    if relevant.is_empty() {
        info!("No changed files to reindex");
        return Ok(IndexStats::default());
    }

    info!("Reindexing {} changed files...", relevant.len());
    let mut stats = IndexStats { files: relevant.len(), chunks: 0 };
    for rel in &relevant {
        ctx.vector_store
            .delete_by_path(rel)
            .await
            .map_err(|e| GraphError::remote(&format!("delete points for {rel}"), e))?;
        stats.chunks += index_file(ctx, root, rag, &root.join(rel)).await?;
    }
    info!("Reindexed {} files ({} chunks)", stats.files, stats.chunks);
    Ok(stats)
}

/// Indexes one file and returns the number of chunks written.
async fn index_file(ctx: &ServiceContext, root: &Path, rag: &RagConfig, path: &Path) -> Result<usize> {
    let Some(rel) = relative_path(root, path) else {
        warn!("Skipping {} outside {}", path.display(), root.display());
        return Ok(0);
    };
    let content = match ctx.fs.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {rel}: {e}");
            return Ok(0);
        }
    };

    let chunks = chunk_file(&content, rag.chunk_size);
    if chunks.is_empty() {
        return Ok(0);
    }
    let inputs: Vec<String> = chunks.iter().map(|chunk| format!("{DOCUMENT_PREFIX}{chunk}")).collect();
    let embeddings = match ctx.embedder.embed(&inputs).await {
        Ok(embeddings) => embeddings,
        Err(e) => {
            warn!("Error getting embeddings for {rel}: {e}");
            return Ok(0);
        }
    };

    let layer = determine_layer(&rel);
    let kind = determine_kind(&rel);
    let points: Vec<Point> = chunks
        .iter()
        .zip(embeddings)
        .enumerate()
        .map(|(i, (chunk, vector))| Point {
            id: point_id(&rel, i),
            vector,
            payload: ChunkPayload {
                path: rel.clone(),
                layer: layer.to_string(),
                kind: kind.to_string(),
                content: (*chunk).to_string(),
                chunk_index: i,
            },
        })
        .collect();
    let count = points.len();
    ctx.vector_store.upsert(points).await.map_err(|e| GraphError::remote(&format!("upsert {rel}"), e))?;
    Ok(count)
}
