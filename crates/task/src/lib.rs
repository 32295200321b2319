//! Completion tracking for query coordinator actions
//!
//! An action is one pending change to cluster distribution: load or release a
//! segment, move a channel, or update what a shard leader knows. The remote
//! call that triggers it returns long before the change is visible, so each
//! action decides whether it has finished by reading a distribution snapshot
//! together with its own acknowledgment flag.
//!
//! Completion checks never fail. Missing or stale data simply means the
//! action is not finished yet.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod ack;
mod action;
mod action_type;
mod base;
mod channel;
mod error;
mod leader;
mod segment;

pub use ack::AckFlag;
pub use action::Action;
pub use action_type::ActionType;
pub use base::BaseAction;
pub use channel::ChannelAction;
pub use error::{ActionError, ActionResult};
pub use leader::{LeaderAction, LeaderMutation};
pub use segment::{DataScope, SegmentAction};
