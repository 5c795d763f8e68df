//! In-memory adapters.
//!
//! Every adapter keeps its state behind a `Mutex` so it satisfies the
//! `Send + Sync` bound of the ports and can be inspected after a run.

pub mod clock;
pub mod embedder;
pub mod filesystem;
pub mod git;
pub mod vector_store;

pub use clock::FixedClock;
pub use embedder::HashEmbedder;
pub use filesystem::MemoryFileSystem;
pub use git::StaticGitRepo;
pub use vector_store::MemoryVectorStore;

use crate::ports::PortError;

/// Error returned when a lock was poisoned by a panicking thread.
pub(crate) fn poisoned<T>(_: std::sync::PoisonError<T>) -> PortError {
    "in-memory adapter lock poisoned".into()
}
