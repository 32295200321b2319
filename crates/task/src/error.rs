//! Error types for action construction

use querycoord_distribution::NodeId;
use thiserror::Error;

/// Result type for action construction
pub type ActionResult<T> = Result<T, ActionError>;

/// Errors raised while building an action
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// Node ID zero does not name a node
    #[error("Invalid node: {0}")]
    InvalidNode(NodeId),

    /// Every action targets a shard
    #[error("Shard name must not be empty")]
    EmptyShard,
}
