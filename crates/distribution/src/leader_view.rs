//! Leader views reported by shard leaders
//!
//! A leader view is a leader's own account of where the segments of one
//! channel live. Views are versioned so that readers can tell a fresh report
//! from a stale one; during leader handover a channel can briefly carry more
//! than one view.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, PartitionId, SegmentId, Version};

/// A leader's record of which worker owns a sealed segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentDist {
    /// Worker that serves the segment
    pub node: NodeId,
    /// Load-time version stamp
    pub version: Version,
}

/// A leader's view of one channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderView {
    /// Leader node that reported this view
    pub leader: NodeId,
    /// Channel (shard) the view covers
    pub channel: String,
    /// Monotonically increasing per leader
    pub version: Version,
    /// Sealed segments and their owners; only the latest owner is kept
    pub segments: HashMap<SegmentId, SegmentDist>,
    /// Segments still being loaded
    pub growing_segments: HashSet<SegmentId>,
    /// Partition statistics versions known to the leader
    pub partition_stats_versions: HashMap<PartitionId, Version>,
}

impl LeaderView {
    /// Create an empty view
    pub fn new(leader: NodeId, channel: impl Into<String>, version: Version) -> Self {
        Self {
            leader,
            channel: channel.into(),
            version,
            segments: HashMap::new(),
            growing_segments: HashSet::new(),
            partition_stats_versions: HashMap::new(),
        }
    }

    /// Record a sealed segment owned by `node`
    pub fn with_segment(mut self, segment: SegmentId, node: NodeId, version: Version) -> Self {
        self.segments.insert(segment, SegmentDist { node, version });
        self
    }

    /// Record a growing segment
    pub fn with_growing(mut self, segment: SegmentId) -> Self {
        self.growing_segments.insert(segment);
        self
    }

    /// Replace the partition statistics versions
    pub fn with_partition_stats(
        mut self,
        versions: impl IntoIterator<Item = (PartitionId, Version)>,
    ) -> Self {
        self.partition_stats_versions = versions.into_iter().collect();
        self
    }

    /// Owner record for a sealed segment, if any
    pub fn segment_owner(&self, segment: SegmentId) -> Option<&SegmentDist> {
        self.segments.get(&segment)
    }

    /// Whether the segment is recorded as sealed
    pub fn has_sealed(&self, segment: SegmentId) -> bool {
        self.segments.contains_key(&segment)
    }

    /// Whether the segment is recorded as growing
    pub fn has_growing(&self, segment: SegmentId) -> bool {
        self.growing_segments.contains(&segment)
    }
}

/// Predicate used to select leader views from a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderViewFilter {
    /// Views reported by this leader
    Leader(NodeId),
    /// Views covering this channel
    Channel(String),
    /// Views that record the segment, either as sealed or as growing
    Segment {
        /// Segment to look for
        segment: SegmentId,
        /// Look in the growing set instead of the sealed map
        growing: bool,
    },
}

impl LeaderViewFilter {
    /// Check a single view against this filter
    pub fn matches(&self, view: &LeaderView) -> bool {
        match self {
            Self::Leader(leader) => view.leader == *leader,
            Self::Channel(channel) => view.channel == *channel,
            Self::Segment {
                segment,
                growing: true,
            } => view.has_growing(*segment),
            Self::Segment {
                segment,
                growing: false,
            } => view.has_sealed(*segment),
        }
    }
}
