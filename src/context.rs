//! Service contexts bundling port trait objects.

use crate::adapters::live::clock::LiveClock;
use crate::adapters::live::embedder::OllamaEmbedder;
use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::git::LiveGitRepo;
use crate::adapters::live::vector_store::QdrantStore;
use crate::adapters::memory::{
    FixedClock, HashEmbedder, MemoryFileSystem, MemoryVectorStore, StaticGitRepo,
};
use crate::config::RagConfig;
use crate::ports::clock::Clock;
use crate::ports::embedder::Embedder;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;
use crate::ports::vector_store::VectorStore;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Used by the
/// retrieval commands; the graph pipeline takes a [`GraphContext`].
pub struct ServiceContext {
    /// Clock for snapshot timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for sources and snapshots.
    pub fs: Box<dyn FileSystem>,
    /// Git working tree for incremental indexing.
    pub git: Box<dyn GitRepo>,
    /// Embedding service.
    pub embedder: Box<dyn Embedder>,
    /// Vector store holding the code index.
    pub vector_store: Box<dyn VectorStore>,
}

impl ServiceContext {
    /// Creates a live context. HTTP clients are built once here from `rag`.
    #[must_use]
    pub fn live(rag: &RagConfig) -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            git: Box::new(LiveGitRepo),
            embedder: Box::new(OllamaEmbedder::new(&rag.ollama_url, &rag.embed_model)),
            vector_store: Box::new(QdrantStore::new(&rag.qdrant_url, &rag.collection)),
        }
    }

    /// Creates a fully in-memory context around `fs`: fixed clock, no git
    /// changes, hashing embedder with `vector_size` dimensions and an empty
    /// vector store.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem, vector_size: usize) -> Self {
        Self {
            clock: Box::new(FixedClock::default()),
            fs: Box::new(fs),
            git: Box::new(StaticGitRepo::default()),
            embedder: Box::new(HashEmbedder::new(vector_size)),
            vector_store: Box::new(MemoryVectorStore::new()),
        }
    }
}

/// The two ports the graph pipeline touches. Building one opens no network
/// clients.
pub struct GraphContext {
    /// Clock for snapshot timestamps.
    pub clock: Box<dyn Clock>,
    /// Filesystem for sources and snapshots.
    pub fs: Box<dyn FileSystem>,
}

impl GraphContext {
    /// Creates a context over the system clock and the real filesystem.
    #[must_use]
    pub fn live() -> Self {
        Self { clock: Box::new(LiveClock), fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context around `fs` with a fixed clock.
    #[must_use]
    pub fn in_memory(fs: MemoryFileSystem) -> Self {
        Self { clock: Box::new(FixedClock::default()), fs: Box::new(fs) }
    }
}
