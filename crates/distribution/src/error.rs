//! Error types for distribution updates

use thiserror::Error;

use crate::ids::{NodeId, Version};

/// Result type for distribution operations
pub type DistributionResult<T> = Result<T, DistributionError>;

/// Errors returned when publishing distribution state
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DistributionError {
    /// A leader view arrived with a version older than the one already published
    #[error("Stale leader view from {leader} on {channel}: version {offered} < {current}")]
    StaleView {
        /// Leader that reported the view
        leader: NodeId,
        /// Channel the view covers
        channel: String,
        /// Version already published
        current: Version,
        /// Version that was offered
        offered: Version,
    },

    /// A leader view is missing its identity
    #[error("Invalid leader view: {0}")]
    InvalidView(String),
}
