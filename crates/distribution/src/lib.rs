//! Distribution state for the query coordinator
//!
//! This crate provides:
//! - Identifier types (NodeId, SegmentId)
//! - Leader views reported by shard leaders
//! - Immutable distribution snapshots and their filter queries
//! - A copy-on-write manager that republishes snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration types
pub mod config;

/// Error types
pub mod error;

/// Identifier types
pub mod ids;

/// Leader view types and filters
pub mod leader_view;

/// Snapshot publisher
pub mod manager;

/// Immutable distribution snapshot
pub mod snapshot;

pub use {
    config::DistributionConfig,
    error::{DistributionError, DistributionResult},
    ids::{NodeId, PartitionId, SegmentId, Version},
    leader_view::{LeaderView, LeaderViewFilter, SegmentDist},
    manager::DistributionManager,
    snapshot::DistributionSnapshot,
};
