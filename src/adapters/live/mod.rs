//! Live adapters for real external interactions.

pub mod clock;
pub mod embedder;
pub mod filesystem;
pub mod git;
pub mod vector_store;

/// Turns any displayable failure into a port error with context.
pub(crate) fn port_error(context: &str, err: impl std::fmt::Display) -> crate::ports::PortError {
    format!("{context}: {err}").into()
}
