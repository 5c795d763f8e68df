//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the graph tooling and an
//! external system (time, filesystem, git, embedding API, vector store).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod embedder;
pub mod filesystem;
pub mod git;
pub mod vector_store;

pub use clock::Clock;
pub use embedder::{EmbedFuture, Embedder};
pub use filesystem::FileSystem;
pub use git::GitRepo;
pub use vector_store::{
    ChunkPayload, FieldCondition, MatchValue, PayloadFilter, Point, ScoredPoint, SearchRequest,
    StoreFuture, VectorStore,
};

/// Error type shared by every port method.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
