//! Consensus error types.

use crate::context::Phase;
use merge_types::BlockHash;
use thiserror::Error;

/// Errors that can occur in the merge transition layer.
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// A transition dispatcher was built without one of its behavior objects.
    #[error("misconfigured dispatcher: missing {missing} object")]
    MisconfiguredDispatcher {
        /// The side that was not supplied.
        missing: Phase,
    },

    /// A header was appended whose parent is not in the chain store.
    #[error("unknown parent: {0}")]
    UnknownParent(BlockHash),

    /// Invalid merge configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for merge transition operations.
pub type Result<T> = std::result::Result<T, ConsensusError>;
