use std::fmt;

use serde::{Deserialize, Serialize};

/// What an action does to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    /// Attach a segment or channel to a node
    Grow,
    /// Detach a segment or channel from a node
    Reduce,
    /// Refresh metadata in place
    Update,
}

impl ActionType {
    /// Fixed label used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Grow => "Grow",
            Self::Reduce => "Reduce",
            Self::Update => "Update",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
