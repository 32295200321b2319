//! Immutable distribution snapshot
//!
//! Pure state container. A snapshot is never mutated once published; the
//! manager builds a new one for every write.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::ids::{NodeId, SegmentId};
use crate::leader_view::{LeaderView, LeaderViewFilter};

/// Point-in-time view of where segments and channel leaders live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSnapshot {
    /// Sealed segments physically held by each worker
    node_segments: HashMap<NodeId, HashSet<SegmentId>>,

    /// Leader views per channel, in publish order
    leader_views: BTreeMap<String, Vec<LeaderView>>,
}

impl DistributionSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add segments to a node's physical set
    pub fn with_node_segments(
        mut self,
        node: NodeId,
        segments: impl IntoIterator<Item = SegmentId>,
    ) -> Self {
        self.node_segments.entry(node).or_default().extend(segments);
        self
    }

    /// Append a leader view; earlier views for the same leader are kept
    pub fn with_leader_view(mut self, view: LeaderView) -> Self {
        self.leader_views
            .entry(view.channel.clone())
            .or_default()
            .push(view);
        self
    }

    /// Physical segment set of a node
    pub fn node_segments(&self, node: NodeId) -> Option<&HashSet<SegmentId>> {
        self.node_segments.get(&node)
    }

    /// Whether a node physically holds a segment
    pub fn node_holds(&self, node: NodeId, segment: SegmentId) -> bool {
        self.node_segments
            .get(&node)
            .is_some_and(|segments| segments.contains(&segment))
    }

    /// Nodes that physically hold a segment, sorted
    pub fn segment_nodes(&self, segment: SegmentId) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self
            .node_segments
            .iter()
            .filter(|(_, segments)| segments.contains(&segment))
            .map(|(node, _)| *node)
            .collect();
        nodes.sort();
        nodes
    }

    /// Leader views matching every filter
    pub fn leader_views(&self, filters: &[LeaderViewFilter]) -> Vec<&LeaderView> {
        // Narrow by channel first when one is given, it is the map key
        let channel = filters.iter().find_map(|filter| match filter {
            LeaderViewFilter::Channel(channel) => Some(channel),
            _ => None,
        });

        self.leader_views
            .iter()
            .filter(|(name, _)| channel.is_none_or(|channel| *name == channel))
            .flat_map(|(_, views)| views)
            .filter(|view| filters.iter().all(|filter| filter.matches(view)))
            .collect()
    }

    /// Leaders that currently report a view for a channel
    pub fn channel_leaders(&self, channel: &str) -> Vec<NodeId> {
        let mut leaders: Vec<NodeId> = self
            .leader_views
            .get(channel)
            .into_iter()
            .flatten()
            .map(|view| view.leader)
            .collect();
        leaders.sort();
        leaders.dedup();
        leaders
    }

    pub(crate) fn set_node_segments(&mut self, node: NodeId, segments: HashSet<SegmentId>) {
        if segments.is_empty() {
            self.node_segments.remove(&node);
        } else {
            self.node_segments.insert(node, segments);
        }
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) -> bool {
        let mut removed = self.node_segments.remove(&node).is_some();
        for views in self.leader_views.values_mut() {
            let before = views.len();
            views.retain(|view| view.leader != node);
            removed |= views.len() != before;
        }
        self.leader_views.retain(|_, views| !views.is_empty());
        removed
    }

    /// Latest view published by a leader for a channel
    pub(crate) fn current_view(&self, leader: NodeId, channel: &str) -> Option<&LeaderView> {
        self.leader_views
            .get(channel)?
            .iter()
            .filter(|view| view.leader == leader)
            .max_by_key(|view| view.version)
    }

    /// Replace all views of the same leader on the view's channel
    pub(crate) fn replace_view(&mut self, view: LeaderView) {
        let views = self.leader_views.entry(view.channel.clone()).or_default();
        views.retain(|existing| existing.leader != view.leader);
        views.push(view);
    }

    pub(crate) fn take_view(&mut self, leader: NodeId, channel: &str) -> Option<LeaderView> {
        let views = self.leader_views.get_mut(channel)?;
        let position = views.iter().rposition(|view| view.leader == leader)?;
        let view = views.remove(position);
        views.retain(|existing| existing.leader != leader);
        if views.is_empty() {
            self.leader_views.remove(channel);
        }
        Some(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64) -> NodeId {
        NodeId::new(id)
    }

    fn segment(id: i64) -> SegmentId {
        SegmentId::new(id)
    }

    fn snapshot() -> DistributionSnapshot {
        DistributionSnapshot::new()
            .with_node_segments(node(2), [segment(10), segment(11)])
            .with_node_segments(node(3), [segment(11)])
            .with_leader_view(
                LeaderView::new(node(1), "dml_0", 1).with_segment(segment(10), node(2), 7),
            )
            .with_leader_view(LeaderView::new(node(4), "dml_1", 1).with_growing(segment(12)))
    }

    #[test]
    fn test_node_segment_queries() {
        let snapshot = snapshot();

        assert!(snapshot.node_holds(node(2), segment(10)));
        assert!(!snapshot.node_holds(node(3), segment(10)));
        assert!(!snapshot.node_holds(node(9), segment(10)));
        assert_eq!(snapshot.segment_nodes(segment(11)), vec![node(2), node(3)]);
        assert!(snapshot.segment_nodes(segment(99)).is_empty());
        assert_eq!(snapshot.node_segments(node(3)).map(HashSet::len), Some(1));
    }

    #[test]
    fn test_leader_view_filters_are_anded() {
        let snapshot = snapshot();

        assert_eq!(snapshot.leader_views(&[]).len(), 2);
        assert_eq!(
            snapshot
                .leader_views(&[
                    LeaderViewFilter::Leader(node(1)),
                    LeaderViewFilter::Channel("dml_0".to_string()),
                ])
                .len(),
            1
        );
        assert!(
            snapshot
                .leader_views(&[
                    LeaderViewFilter::Leader(node(1)),
                    LeaderViewFilter::Channel("dml_1".to_string()),
                ])
                .is_empty()
        );
        assert_eq!(
            snapshot.leader_views(&[LeaderViewFilter::Segment {
                segment: segment(12),
                growing: true,
            }])[0]
                .leader,
            node(4)
        );
    }

    #[test]
    fn test_channel_leaders_during_handover() {
        let snapshot = snapshot()
            .with_leader_view(LeaderView::new(node(5), "dml_0", 1))
            .with_leader_view(LeaderView::new(node(1), "dml_0", 2));

        assert_eq!(snapshot.channel_leaders("dml_0"), vec![node(1), node(5)]);
        assert!(snapshot.channel_leaders("dml_9").is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = snapshot().with_leader_view(
            LeaderView::new(node(1), "dml_0", 2).with_partition_stats([(7, 70)]),
        );

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: DistributionSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, snapshot);
        assert!(decoded.node_holds(node(3), segment(11)));
        assert_eq!(
            decoded.leader_views(&[LeaderViewFilter::Leader(node(1))])[0]
                .segment_owner(segment(10))
                .map(|dist| dist.node),
            Some(node(2))
        );
    }

    #[test]
    fn test_remove_node_drops_segments_and_views() {
        let mut snapshot = snapshot();

        assert!(snapshot.remove_node(node(1)));
        assert!(snapshot.channel_leaders("dml_0").is_empty());
        assert!(snapshot.remove_node(node(2)));
        assert!(snapshot.node_segments(node(2)).is_none());
        assert!(!snapshot.remove_node(node(42)));
    }
}
