//! Adapter implementations for port traits.
//!
//! - `live`: real filesystem, git CLI, Ollama and Qdrant over HTTP.
//! - `memory`: deterministic in-process doubles used by tests.

pub mod live;
pub mod memory;
