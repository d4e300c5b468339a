//! Runtime error types.

use thiserror::Error;

/// Errors surfaced by the direct (non-dispatch) runtime API.
///
/// Calls travelling through the dispatch protocol itself never raise
/// these; there, failures collapse to sentinel results and a line on
/// the error channel.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A channel name was already registered to a different channel.
    #[error("channel name already registered: {0}")]
    DuplicateName(String),

    /// The channel table reached its capacity.
    #[error("channel table is full ({0} channels)")]
    TableFull(usize),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
