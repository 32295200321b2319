use querycoord_distribution::NodeId;

use crate::action_type::ActionType;
use crate::error::{ActionError, ActionResult};

/// Identity shared by every action: target node, kind and shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseAction {
    node: NodeId,
    action_type: ActionType,
    shard: String,
}

impl BaseAction {
    /// Create a base action, rejecting a zero node or an empty shard
    pub fn new(
        node: NodeId,
        action_type: ActionType,
        shard: impl Into<String>,
    ) -> ActionResult<Self> {
        let shard = shard.into();
        if !node.is_valid() {
            return Err(ActionError::InvalidNode(node));
        }
        if shard.is_empty() {
            return Err(ActionError::EmptyShard);
        }

        Ok(Self {
            node,
            action_type,
            shard,
        })
    }

    /// Target node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Action kind
    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    /// Shard (channel) key
    pub fn shard(&self) -> &str {
        &self.shard
    }
}
