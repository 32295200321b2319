//! Channel assignment actions

use querycoord_distribution::{DistributionSnapshot, NodeId};
use tracing::trace;

use crate::action_type::ActionType;
use crate::base::BaseAction;
use crate::error::ActionResult;

/// Assign a channel to a node or take it away.
///
/// Leader view membership is authoritative here; there is no
/// acknowledgment flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAction {
    base: BaseAction,
}

impl ChannelAction {
    /// Create a channel action
    pub fn new(
        node: NodeId,
        action_type: ActionType,
        channel: impl Into<String>,
    ) -> ActionResult<Self> {
        Ok(Self {
            base: BaseAction::new(node, action_type, channel)?,
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

    /// The shard key is the channel name
    pub fn channel_name(&self) -> &str {
        self.base.shard()
    }

    /// Grow finishes once the node leads the channel, Reduce once it no longer does
    pub fn is_finished(&self, snapshot: &DistributionSnapshot) -> bool {
        let leads = snapshot
            .channel_leaders(self.channel_name())
            .contains(&self.node());
        let finished = leads == (self.action_type() == ActionType::Grow);

        trace!(
            "{} of channel {} on {}: finished={}",
            self.action_type(),
            self.channel_name(),
            self.node(),
            finished
        );

        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querycoord_distribution::LeaderView;

    #[test]
    fn test_grow_and_reduce_are_complementary() {
        let node = NodeId::new(3);
        let grow = ChannelAction::new(node, ActionType::Grow, "dml_0").unwrap();
        let reduce = ChannelAction::new(node, ActionType::Reduce, "dml_0").unwrap();

        let without = DistributionSnapshot::new()
            .with_leader_view(LeaderView::new(NodeId::new(4), "dml_0", 1))
            .with_leader_view(LeaderView::new(node, "dml_1", 1));
        assert!(!grow.is_finished(&without));
        assert!(reduce.is_finished(&without));

        let with = without.with_leader_view(LeaderView::new(node, "dml_0", 1));
        assert!(grow.is_finished(&with));
        assert!(!reduce.is_finished(&with));
    }

    #[test]
    fn test_update_finishes_only_without_leadership() {
        let node = NodeId::new(3);
        let update = ChannelAction::new(node, ActionType::Update, "dml_0").unwrap();

        assert!(update.is_finished(&DistributionSnapshot::new()));
        assert!(!update.is_finished(
            &DistributionSnapshot::new().with_leader_view(LeaderView::new(node, "dml_0", 1))
        ));
    }
}
