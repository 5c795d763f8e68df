//! Tool configuration loaded from `koinon-graph.yaml`.
//!
//! Every field has a default matching the Koinon repository layout, so the
//! file is optional. Environment variables override the retrieval endpoints.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::ports::filesystem::FileSystem;

/// File name looked up in the project root.
pub const CONFIG_FILE: &str = "koinon-graph.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    /// Where sources and graph snapshots live.
    pub layout: LayoutConfig,
    /// Collector tuning.
    pub collectors: CollectorConfig,
    /// Retrieval index settings.
    pub rag: RagConfig,
}

/// Project-relative directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Directory whose absence makes the backend generator fail.
    pub source_dir: PathBuf,
    /// Entity files (`*.cs`, not recursive).
    pub entities_dir: PathBuf,
    /// DTO files (`**/*.cs`).
    pub dtos_dir: PathBuf,
    /// Service implementation and interface directories.
    pub services_dirs: Vec<PathBuf>,
    /// Controller files (`*.cs`, not recursive).
    pub controllers_dir: PathBuf,
    /// Directory holding backend, frontend and baseline graphs.
    pub graph_dir: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            entities_dir: PathBuf::from("src/Koinon.Domain/Entities"),
            dtos_dir: PathBuf::from("src/Koinon.Application/DTOs"),
            services_dirs: vec![
                PathBuf::from("src/Koinon.Application/Services"),
                PathBuf::from("src/Koinon.Application/Interfaces"),
            ],
            controllers_dir: PathBuf::from("src/Koinon.Api/Controllers"),
            graph_dir: PathBuf::from("tools/graph"),
        }
    }
}

/// Collector settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CollectorConfig {
    /// File stems that look like marker interfaces (`I` + capital) but are
    /// real types and must still be collected.
    pub interface_exceptions: Vec<String>,
}

/// Retrieval index settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RagConfig {
    /// Vector store collection name.
    pub collection: String,
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Ollama embed endpoint.
    pub ollama_url: String,
    /// Embedding model name.
    pub embed_model: String,
    /// Dimension of the model's vectors.
    pub vector_size: usize,
    /// Qdrant base URL.
    pub qdrant_url: String,
    /// Directory names never indexed.
    pub exclude_dirs: Vec<String>,
    /// File extensions indexed, with the leading dot.
    pub extensions: Vec<String>,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            collection: "koinon-code".to_string(),
            chunk_size: 1000,
            ollama_url: "http://host.docker.internal:11434/api/embed".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            vector_size: 768,
            qdrant_url: "http://host.docker.internal:6333".to_string(),
            exclude_dirs: [
                "node_modules",
                "bin",
                "obj",
                ".git",
                "dist",
                "venv-rag",
                ".venv",
                "__pycache__",
                "htmlcov",
                ".pytest_cache",
                ".claude",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            extensions: [".cs", ".ts", ".tsx", ".js", ".jsx"].into_iter().map(String::from).collect(),
        }
    }
}

impl ToolConfig {
    /// Loads `<root>/koinon-graph.yaml` if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MalformedInput`] when the file exists but cannot
    /// be read or is not valid YAML for this schema.
    pub fn load(fs: &dyn FileSystem, root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }
        let text = fs.read_to_string(&path).map_err(|e| GraphError::malformed(&path, e))?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|e| GraphError::malformed(&path, e))
    }

    /// Applies `KOINON_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides: [(&str, &mut String); 4] = [
            ("KOINON_OLLAMA_URL", &mut self.rag.ollama_url),
            ("KOINON_EMBED_MODEL", &mut self.rag.embed_model),
            ("KOINON_QDRANT_URL", &mut self.rag.qdrant_url),
            ("KOINON_COLLECTION", &mut self.rag.collection),
        ];
        for (key, slot) in overrides {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                log::debug!("{key} overrides configuration");
                *slot = value;
            }
        }
    }

    /// Graph directory resolved against `root`.
    #[must_use]
    pub fn graph_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.layout.graph_dir)
    }
}
