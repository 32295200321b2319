//! Actions that change what a shard leader believes
//!
//! A leader action either moves a segment in the leader's routing table or
//! pushes fresh partition statistics versions. Both are judged against the
//! newest view the leader has reported for the shard.

use std::collections::HashMap;

use querycoord_distribution::{
    DistributionSnapshot, LeaderView, LeaderViewFilter, NodeId, PartitionId, SegmentId, Version,
};
use tracing::trace;

use crate::ack::AckFlag;
use crate::action_type::ActionType;
use crate::base::BaseAction;
use crate::error::{ActionError, ActionResult};

/// What a leader action changes, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderMutation {
    /// Move a segment in the leader's routing table
    Segment {
        /// Segment being routed
        segment: SegmentId,
        /// Load-time version stamp, if known
        version: Option<Version>,
    },
    /// Push partition statistics versions to the leader
    PartitionStats(HashMap<PartitionId, Version>),
}

/// Change a shard leader's view of a segment or of partition statistics
#[derive(Debug)]
pub struct LeaderAction {
    base: BaseAction,
    leader: NodeId,
    mutation: LeaderMutation,
    ack: AckFlag,
}

impl LeaderAction {
    /// Route `segment` on `worker` through `leader`. A zero version means unset.
    pub fn new(
        leader: NodeId,
        worker: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
        segment: SegmentId,
        version: Version,
    ) -> ActionResult<Self> {
        let mutation = LeaderMutation::Segment {
            segment,
            version: (version != 0).then_some(version),
        };
        Self::with_mutation(leader, worker, action_type, shard, mutation)
    }

    /// Push partition statistics versions to `leader`
    pub fn update_partition_stats(
        leader: NodeId,
        worker: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
        versions: HashMap<PartitionId, Version>,
    ) -> ActionResult<Self> {
        Self::with_mutation(
            leader,
            worker,
            action_type,
            shard,
            LeaderMutation::PartitionStats(versions),
        )
    }

    fn with_mutation(
        leader: NodeId,
        worker: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
        mutation: LeaderMutation,
    ) -> ActionResult<Self> {
        if !leader.is_valid() {
            return Err(ActionError::InvalidNode(leader));
        }

        Ok(Self {
            base: BaseAction::new(worker, action_type, shard)?,
            leader,
            mutation,
            ack: AckFlag::new(),
        })
    }

    /// Shared identity
    pub fn base(&self) -> &BaseAction {
        &self.base
    }

    /// Worker the segment is routed to
    pub fn node(&self) -> NodeId {
        self.base.node()
    }

    /// Action kind
    pub fn action_type(&self) -> ActionType {
        self.base.action_type()
    }

    /// Shard led by the leader
    pub fn shard(&self) -> &str {
        self.base.shard()
    }

    /// Leader whose view is changed
    pub fn leader_id(&self) -> NodeId {
        self.leader
    }

    /// What this action changes
    pub fn mutation(&self) -> &LeaderMutation {
        &self.mutation
    }

    /// Segment being routed, for segment mutations
    pub fn segment_id(&self) -> Option<SegmentId> {
        match &self.mutation {
            LeaderMutation::Segment { segment, .. } => Some(*segment),
            LeaderMutation::PartitionStats(_) => None,
        }
    }

    /// Load-time version stamp, for segment mutations that carry one
    pub fn version(&self) -> Option<Version> {
        match &self.mutation {
            LeaderMutation::Segment { version, .. } => *version,
            LeaderMutation::PartitionStats(_) => None,
        }
    }

    /// Target statistics versions, for statistics pushes
    pub fn partition_stats_versions(&self) -> Option<&HashMap<PartitionId, Version>> {
        match &self.mutation {
            LeaderMutation::PartitionStats(versions) => Some(versions),
            LeaderMutation::Segment { .. } => None,
        }
    }

    /// Record that the remote call returned successfully
    pub fn acknowledge(&self) -> bool {
        self.ack.acknowledge()
    }

    /// Whether the remote call has returned successfully
    pub fn is_acknowledged(&self) -> bool {
        self.ack.is_acknowledged()
    }

    /// Whether the leader's newest view reflects the change
    pub fn is_finished(&self, snapshot: &DistributionSnapshot) -> bool {
        let views = snapshot.leader_views(&[
            LeaderViewFilter::Leader(self.leader),
            LeaderViewFilter::Channel(self.shard().to_string()),
        ]);

        // Last one wins on equal versions
        let Some(view) = views.into_iter().max_by_key(|view| view.version) else {
            trace!(
                "{} via leader {} on {}: no leader view yet",
                self.action_type(),
                self.leader,
                self.shard()
            );
            return false;
        };

        let finished = self.is_acknowledged() && self.is_reflected_in(view);

        trace!(
            "{} via leader {} on {} (view version {}): finished={}",
            self.action_type(),
            self.leader,
            self.shard(),
            view.version,
            finished
        );

        finished
    }

    fn is_reflected_in(&self, view: &LeaderView) -> bool {
        match (&self.mutation, self.action_type()) {
            (LeaderMutation::Segment { segment, .. }, ActionType::Grow) => view
                .segment_owner(*segment)
                .is_some_and(|dist| dist.node == self.node()),
            (LeaderMutation::Segment { segment, .. }, ActionType::Reduce) => view
                .segment_owner(*segment)
                .is_none_or(|dist| dist.node != self.node()),
            (LeaderMutation::PartitionStats(versions), ActionType::Update) => {
                *versions == view.partition_stats_versions
            }
            _ => false,
        }
    }
}
