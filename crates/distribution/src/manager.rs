//! Publishing of distribution snapshots
//!
//! Writers build a fresh snapshot from the current one and swap it in.
//! Readers only clone the `Arc` of whatever snapshot is current, so a
//! completion check always sees one self-consistent value no matter how many
//! writes land while it runs.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::DistributionConfig;
use crate::error::{DistributionError, DistributionResult};
use crate::ids::{NodeId, SegmentId};
use crate::leader_view::LeaderView;
use crate::snapshot::DistributionSnapshot;

/// Owns the current distribution snapshot and republishes it on change
#[derive(Debug)]
pub struct DistributionManager {
    current: RwLock<Arc<DistributionSnapshot>>,
    /// Bumped on every successful publish
    version: AtomicU64,
    config: DistributionConfig,
}

impl Default for DistributionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DistributionManager {
    /// Create a manager with default configuration
    pub fn new() -> Self {
        Self::with_config(DistributionConfig::default())
    }

    /// Create a manager with custom configuration
    pub fn with_config(config: DistributionConfig) -> Self {
        debug!(
            "Creating distribution manager (reject_stale_views: {})",
            config.reject_stale_views
        );

        Self {
            current: RwLock::new(Arc::new(DistributionSnapshot::new())),
            version: AtomicU64::new(0),
            config,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<DistributionSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Number of snapshots published so far
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Replace the set of sealed segments a node physically holds
    pub fn update_node_segments(
        &self,
        node: NodeId,
        segments: impl IntoIterator<Item = SegmentId>,
    ) {
        let segments: HashSet<SegmentId> = segments.into_iter().collect();
        let count = segments.len();

        self.publish(|snapshot| {
            snapshot.set_node_segments(node, segments);
            true
        });

        debug!("Updated segment distribution of {} ({} segments)", node, count);
    }

    /// Forget a node: its physical segments and every view it leads
    pub fn remove_node(&self, node: NodeId) {
        if self.publish(|snapshot| snapshot.remove_node(node)) {
            debug!("Removed {} from distribution", node);
        }
    }

    /// Publish a leader view, replacing the leader's previous view of the channel
    pub fn update_leader_view(&self, view: LeaderView) -> DistributionResult<()> {
        if !view.leader.is_valid() {
            return Err(DistributionError::InvalidView(format!(
                "leader view for channel '{}' has no leader",
                view.channel
            )));
        }
        if view.channel.is_empty() {
            return Err(DistributionError::InvalidView(format!(
                "leader view from {} has no channel",
                view.leader
            )));
        }

        let reject_stale = self.config.reject_stale_views;
        let (leader, channel, version) = (view.leader, view.channel.clone(), view.version);

        let result = self.try_publish(|snapshot| {
            if reject_stale {
                if let Some(current) = snapshot.current_view(view.leader, &view.channel) {
                    if view.version < current.version {
                        return Err(DistributionError::StaleView {
                            leader: view.leader,
                            channel: view.channel.clone(),
                            current: current.version,
                            offered: view.version,
                        });
                    }
                }
            }
            snapshot.replace_view(view);
            Ok(())
        });

        match &result {
            Ok(()) => debug!(
                "Published leader view of {} on {} at version {}",
                leader, channel, version
            ),
            Err(e) => warn!("Rejected leader view: {}", e),
        }

        result
    }

    /// Withdraw a leader's view of a channel
    pub fn retire_leader_view(&self, leader: NodeId, channel: &str) -> Option<LeaderView> {
        let mut retired = None;
        self.publish(|snapshot| {
            retired = snapshot.take_view(leader, channel);
            retired.is_some()
        });

        if let Some(view) = &retired {
            debug!(
                "Retired leader view of {} on {} at version {}",
                leader, channel, view.version
            );
        }

        retired
    }

    /// Copy the current snapshot, apply `mutate`, and swap the result in
    /// only if `mutate` reports a change
    fn publish<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut DistributionSnapshot) -> bool,
    {
        let mut current = self.current.write();
        let mut next = DistributionSnapshot::clone(&current);
        if !mutate(&mut next) {
            return false;
        }
        *current = Arc::new(next);
        self.version.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Like `publish`, but `mutate` may refuse the write
    fn try_publish<F>(&self, mutate: F) -> DistributionResult<()>
    where
        F: FnOnce(&mut DistributionSnapshot) -> DistributionResult<()>,
    {
        let mut current = self.current.write();
        let mut next = DistributionSnapshot::clone(&current);
        mutate(&mut next)?;
        *current = Arc::new(next);
        self.version.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn node(id: i64) -> NodeId {
        NodeId::new(id)
    }

    fn segment(id: i64) -> SegmentId {
        SegmentId::new(id)
    }

    #[test]
    fn test_snapshots_are_immutable_after_publish() {
        let manager = DistributionManager::new();
        let before = manager.snapshot();

        manager.update_node_segments(node(1), [segment(10)]);
        let after = manager.snapshot();

        assert!(!before.node_holds(node(1), segment(10)));
        assert!(after.node_holds(node(1), segment(10)));
        assert_eq!(manager.version(), 1);
    }

    #[test]
    fn test_empty_segment_set_removes_node_entry() {
        let manager = DistributionManager::new();
        manager.update_node_segments(node(1), [segment(10)]);
        manager.update_node_segments(node(1), []);

        assert!(manager.snapshot().node_segments(node(1)).is_none());
    }

    #[test]
    fn test_update_leader_view_replaces_previous() {
        let manager = DistributionManager::new();
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 1))
            .unwrap();
        manager
            .update_leader_view(
                LeaderView::new(node(1), "dml_0", 2).with_segment(segment(10), node(2), 5),
            )
            .unwrap();

        let snapshot = manager.snapshot();
        let views = snapshot.leader_views(&[]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].version, 2);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_stale_leader_view_rejected() {
        let manager = DistributionManager::new();
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 5))
            .unwrap();

        let result = manager.update_leader_view(LeaderView::new(node(1), "dml_0", 3));

        assert_matches!(
            result,
            Err(DistributionError::StaleView {
                current: 5,
                offered: 3,
                ..
            })
        );
        assert_eq!(manager.snapshot().leader_views(&[])[0].version, 5);
        assert_eq!(manager.version(), 1);
        assert!(logs_contain("Rejected leader view"));
    }

    #[test]
    fn test_stale_leader_view_accepted_when_configured() {
        let manager = DistributionManager::with_config(DistributionConfig {
            reject_stale_views: false,
        });
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 5))
            .unwrap();
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 3))
            .unwrap();

        assert_eq!(manager.snapshot().leader_views(&[])[0].version, 3);
    }

    #[test]
    fn test_invalid_leader_view_rejected() {
        let manager = DistributionManager::new();

        assert_matches!(
            manager.update_leader_view(LeaderView::new(node(0), "dml_0", 1)),
            Err(DistributionError::InvalidView(_))
        );
        assert_matches!(
            manager.update_leader_view(LeaderView::new(node(1), "", 1)),
            Err(DistributionError::InvalidView(_))
        );
        assert_eq!(manager.version(), 0);
    }

    #[test]
    fn test_retire_and_remove_node() {
        let manager = DistributionManager::new();
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 1))
            .unwrap();
        manager
            .update_leader_view(LeaderView::new(node(2), "dml_1", 1))
            .unwrap();
        manager.update_node_segments(node(2), [segment(10)]);

        let retired = manager.retire_leader_view(node(1), "dml_0");
        assert_eq!(retired.map(|view| view.version), Some(1));
        assert!(manager.retire_leader_view(node(1), "dml_0").is_none());

        manager.remove_node(node(2));
        let snapshot = manager.snapshot();
        assert!(snapshot.leader_views(&[]).is_empty());
        assert!(snapshot.node_segments(node(2)).is_none());
    }

    #[test]
    fn test_noop_writes_do_not_publish() {
        let manager = DistributionManager::new();
        manager
            .update_leader_view(LeaderView::new(node(1), "dml_0", 1))
            .unwrap();
        let before = manager.snapshot();
        assert_eq!(manager.version(), 1);

        assert!(manager.retire_leader_view(node(1), "dml_9").is_none());
        assert!(manager.retire_leader_view(node(7), "dml_0").is_none());
        manager.remove_node(node(42));

        assert_eq!(manager.version(), 1);
        assert!(Arc::ptr_eq(&before, &manager.snapshot()));

        manager.remove_node(node(1));
        assert_eq!(manager.version(), 2);
    }
}
