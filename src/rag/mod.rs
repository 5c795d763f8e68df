//! Retrieval index over the codebase: chunking, layer and kind
//! classification, indexing, natural-language query and semantic
//! architecture validators.

pub mod heuristics;
pub mod index;
pub mod query;
pub mod validators;

use std::path::Path;

use uuid::Uuid;

/// Prefix the embedding model expects on indexed documents.
pub const DOCUMENT_PREFIX: &str = "search_document: ";
/// Prefix the embedding model expects on search queries.
pub const QUERY_PREFIX: &str = "search_query: ";

/// Path segment -> layer, first match wins.
const LAYER_SEGMENTS: &[(&str, &str)] = &[
    ("/Koinon.Domain/", "Domain"),
    ("/Koinon.Application/", "Application"),
    ("/Koinon.Infrastructure/", "Infrastructure"),
    ("/Koinon.Api/", "API"),
    ("/src/web/", "Frontend"),
];

/// Architectural layer of a project-relative path.
#[must_use]
pub fn determine_layer(relative_path: &str) -> &'static str {
    let rooted = format!("/{}", relative_path.trim_start_matches('/'));
    LAYER_SEGMENTS
        .iter()
        .find(|(segment, _)| rooted.contains(segment))
        .map_or("Other", |(_, layer)| layer)
}

/// Code kind of a project-relative path.
#[must_use]
pub fn determine_kind(relative_path: &str) -> &'static str {
    let path = format!("/{}", relative_path.trim_start_matches('/'));
    let lower = path.to_lowercase();
    if path.contains("/Entities/") && path.ends_with(".cs") {
        "Entity"
    } else if path.contains("/DTOs/") || path.contains("Dto.cs") {
        "DTO"
    } else if path.contains("Controller.cs") {
        "Controller"
    } else if path.contains("Service.cs") || path.contains("/Services/") {
        "Service"
    } else if path.contains("Repository.cs") || path.contains("/Repositories/") {
        "Repository"
    } else if (path.ends_with(".tsx") || path.ends_with(".jsx")) && lower.contains("/components/") {
        "Component"
    } else if path.ends_with(".ts") && lower.contains("/hooks/") {
        "Hook"
    } else {
        "Other"
    }
}

/// Splits `content` into chunks of at most `chunk_size` characters,
/// dropping whitespace-only chunks. Never splits inside a character.
#[must_use]
pub fn chunk_file(content: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in content.char_indices() {
        if count == chunk_size {
            chunks.push(&content[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < content.len() {
        chunks.push(&content[start..]);
    }
    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

/// Stable point id for chunk `index` of `relative_path`, so re-indexing a
/// file overwrites its own points.
#[must_use]
pub fn point_id(relative_path: &str, index: usize) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{relative_path}:chunk-{index}").as_bytes()).to_string()
}

/// `path` relative to `root` with `/` separators, or `None` outside the root.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    Some(parts.join("/"))
}

/// First `len` characters of `text`.
#[must_use]
pub fn snippet(text: &str, len: usize) -> &str {
    text.char_indices().nth(len).map_or(text, |(idx, _)| &text[..idx])
}
