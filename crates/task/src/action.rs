use std::fmt;

use querycoord_distribution::{DistributionSnapshot, NodeId};
use tracing::debug;

use crate::action_type::ActionType;
use crate::channel::ChannelAction;
use crate::leader::LeaderAction;
use crate::segment::SegmentAction;

/// Any action the scheduler can poll
#[derive(Debug)]
pub enum Action {
    /// Segment load, release or refresh
    Segment(SegmentAction),
    /// Channel assignment
    Channel(ChannelAction),
    /// Leader routing or statistics change
    Leader(LeaderAction),
}

impl Action {
    /// Target node
    pub fn node(&self) -> NodeId {
        match self {
            Self::Segment(action) => action.node(),
            Self::Channel(action) => action.node(),
            Self::Leader(action) => action.node(),
        }
    }

    /// Action kind
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Segment(action) => action.action_type(),
            Self::Channel(action) => action.action_type(),
            Self::Leader(action) => action.action_type(),
        }
    }

    /// Shard key
    pub fn shard(&self) -> &str {
        match self {
            Self::Segment(action) => action.shard(),
            Self::Channel(action) => action.channel_name(),
            Self::Leader(action) => action.shard(),
        }
    }

    /// Record that the remote call returned successfully.
    ///
    /// Channel actions have no flag and always return false.
    pub fn acknowledge(&self) -> bool {
        let transitioned = match self {
            Self::Segment(action) => action.acknowledge(),
            Self::Channel(_) => false,
            Self::Leader(action) => action.acknowledge(),
        };

        if transitioned {
            debug!("Acknowledged {}", self);
        }

        transitioned
    }

    /// Whether the action has taken effect in `snapshot`
    pub fn is_finished(&self, snapshot: &DistributionSnapshot) -> bool {
        match self {
            Self::Segment(action) => action.is_finished(snapshot),
            Self::Channel(action) => action.is_finished(snapshot),
            Self::Leader(action) => action.is_finished(snapshot),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Segment(_) => "segment",
            Self::Channel(_) => "channel",
            Self::Leader(_) => "leader",
        };
        write!(
            f,
            "{} {} on {} ({})",
            self.action_type(),
            variant,
            self.node(),
            self.shard()
        )
    }
}

impl From<SegmentAction> for Action {
    fn from(action: SegmentAction) -> Self {
        Self::Segment(action)
    }
}

impl From<ChannelAction> for Action {
    fn from(action: ChannelAction) -> Self {
        Self::Channel(action)
    }
}

impl From<LeaderAction> for Action {
    fn from(action: LeaderAction) -> Self {
        Self::Leader(action)
    }
}
