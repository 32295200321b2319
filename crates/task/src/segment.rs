//! Segment load and release actions

use querycoord_distribution::{DistributionSnapshot, LeaderViewFilter, NodeId, SegmentId};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ack::AckFlag;
use crate::action_type::ActionType;
use crate::base::BaseAction;
use crate::error::ActionResult;

/// Which part of a segment's data an action applies to
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataScope {
    /// Both streaming and historical data
    #[default]
    All,
    /// Streaming (growing) data only
    Streaming,
    /// Historical (sealed) data only
    Historical,
}

/// Load, release or refresh one physical segment on a worker
#[derive(Debug)]
pub struct SegmentAction {
    base: BaseAction,
    segment_id: SegmentId,
    scope: DataScope,
    ack: AckFlag,
}

impl SegmentAction {
    /// Create a segment action covering all data
    pub fn new(
        node: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
        segment_id: SegmentId,
    ) -> ActionResult<Self> {
        Self::with_scope(node, action_type, shard, segment_id, DataScope::All)
    }

    /// Create a segment action for a specific data scope
    pub fn with_scope(
        node: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
        segment_id: SegmentId,
        scope: DataScope,
    ) -> ActionResult<Self> {
        Ok(Self {
            base: BaseAction::new(node, action_type, shard)?,
            segment_id,
            scope,
            ack: AckFlag::new(),
        })
    }

    /// Shared identity
    pub fn base(&self) -> &BaseAction {
        &self.base
    }

    /// Target node
    pub fn node(&self) -> NodeId {
        self.base.node()
    }

    /// Action kind
    pub fn action_type(&self) -> ActionType {
        self.base.action_type()
    }

    /// Shard the segment belongs to
    pub fn shard(&self) -> &str {
        self.base.shard()
    }

    /// Segment this action moves
    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    /// Data scope
    pub fn scope(&self) -> DataScope {
        self.scope
    }

    /// Record that the remote call returned successfully
    pub fn acknowledge(&self) -> bool {
        self.ack.acknowledge()
    }

    /// Whether the remote call has returned successfully
    pub fn is_acknowledged(&self) -> bool {
        self.ack.is_acknowledged()
    }

    /// Whether the change is visible in `snapshot`
    pub fn is_finished(&self, snapshot: &DistributionSnapshot) -> bool {
        let finished = match self.action_type() {
            ActionType::Grow => self.is_loaded(snapshot),
            ActionType::Reduce => self.is_released(snapshot),
            ActionType::Update => self.is_acknowledged(),
        };

        trace!(
            "{} of {} on {}: finished={}",
            self.action_type(),
            self.segment_id,
            self.node(),
            finished
        );

        finished
    }

    /// Sealed in some leader view, physically on the node, and acknowledged
    fn is_loaded(&self, snapshot: &DistributionSnapshot) -> bool {
        let sealed = !snapshot
            .leader_views(&[LeaderViewFilter::Segment {
                segment: self.segment_id,
                growing: false,
            }])
            .is_empty();

        sealed && snapshot.node_holds(self.node(), self.segment_id) && self.is_acknowledged()
    }

    fn is_released(&self, snapshot: &DistributionSnapshot) -> bool {
        let sealed = snapshot.node_holds(self.node(), self.segment_id);
        let growing = snapshot
            .leader_views(&[LeaderViewFilter::Leader(self.node())])
            .iter()
            .any(|view| view.has_growing(self.segment_id));

        if !sealed && !growing {
            return true;
        }

        // Leader views keep only the latest owner of a segment, so after a
        // quick reassignment a stale release target cannot be told apart from
        // one that is already gone. The acknowledgment alone counts as done;
        // a release must therefore never be followed by another step on the
        // same segment within one task.
        self.is_acknowledged()
    }
}
