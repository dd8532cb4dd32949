//! View model for the journey map: trail geometry plus per-node state.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::METERS_PER_KILOMETER;
use crate::data::Journey;
use crate::path::{PathConfig, Point, TrailLayout, synthesize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Completed,
    Current,
    Locked,
}

/// One milestone node on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub milestone_id: String,
    pub short_name: String,
    /// `None` when no trail could be laid out for the journey.
    pub position: Option<Point>,
    pub state: NodeState,
    pub distance_km: f64,
}

impl MapNode {
    /// Label shown under the node, e.g. `5.5 km`.
    #[must_use]
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }
}

/// Link between consecutive nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub from: usize,
    pub to: usize,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyMapView {
    pub journey_id: String,
    pub trail: TrailLayout,
    pub nodes: Vec<MapNode>,
    pub connectors: Vec<Connector>,
    /// First incomplete milestone, or the last one once everything is done.
    pub current_index: Option<usize>,
}

impl JourneyMapView {
    /// Combine the synthesized trail for `journey` with its completion state.
    ///
    /// Completed ids that do not belong to the journey are ignored.
    #[must_use]
    pub fn build(journey: &Journey, completed: &BTreeSet<String>, config: &PathConfig) -> Self {
        let milestones = &journey.milestones;
        let is_done = |index: usize| completed.contains(&milestones[index].id);
        let current_index = milestones
            .iter()
            .position(|m| !completed.contains(&m.id))
            .or_else(|| milestones.len().checked_sub(1));

        let trail = synthesize(milestones, current_index, config);
        let nodes = milestones
            .iter()
            .enumerate()
            .map(|(index, milestone)| {
                let state = if is_done(index) {
                    NodeState::Completed
                } else if Some(index) == current_index {
                    NodeState::Current
                } else {
                    NodeState::Locked
                };
                MapNode {
                    milestone_id: milestone.id.clone(),
                    short_name: milestone.short_name.clone(),
                    position: trail.points.get(index).copied(),
                    state,
                    distance_km: f64::from(milestone.distance_from_start) / METERS_PER_KILOMETER,
                }
            })
            .collect();
        let connectors = (1..milestones.len())
            .map(|to| {
                let from = to - 1;
                Connector {
                    from,
                    to,
                    active: is_done(from) && current_index.is_some_and(|current| from < current),
                }
            })
            .collect();

        Self {
            journey_id: journey.id.clone(),
            trail,
            nodes,
            connectors,
            current_index,
        }
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.state == NodeState::Completed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn emmaus() -> &'static Journey {
        Catalog::builtin().get_journey_by_id("road-to-emmaus").unwrap()
    }

    fn completed(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(ToString::to_string).collect()
    }

    fn states(view: &JourneyMapView) -> Vec<NodeState> {
        view.nodes.iter().map(|n| n.state).collect()
    }

    #[test]
    fn fresh_journey_starts_at_first_node() {
        let view = JourneyMapView::build(emmaus(), &BTreeSet::new(), &PathConfig::default());
        assert_eq!(view.current_index, Some(0));
        assert_eq!(
            states(&view),
            [NodeState::Current, NodeState::Locked, NodeState::Locked]
        );
        assert!(view.connectors.iter().all(|c| !c.active));
        assert!(view.trail.active.segments.is_empty());
    }

    #[test]
    fn partial_progress_activates_walked_connectors() {
        let view = JourneyMapView::build(
            emmaus(),
            &completed(&["emmaus-start"]),
            &PathConfig::default(),
        );
        assert_eq!(
            states(&view),
            [NodeState::Completed, NodeState::Current, NodeState::Locked]
        );
        assert_eq!(
            view.connectors.iter().map(|c| c.active).collect::<Vec<_>>(),
            [true, false]
        );
        assert_eq!(view.trail.active.segments.len(), 1);
    }

    #[test]
    fn finished_journey_marks_last_node_current_index() {
        let all = completed(&["emmaus-start", "emmaus-encounter", "emmaus-arrival"]);
        let view = JourneyMapView::build(emmaus(), &all, &PathConfig::default());
        assert_eq!(view.current_index, Some(2));
        assert_eq!(view.completed_count(), 3);
        assert!(view.connectors.iter().all(|c| c.active));
        assert_eq!(view.trail.active, view.trail.full);
    }

    #[test]
    fn out_of_order_completion_does_not_light_later_connectors() {
        let view = JourneyMapView::build(
            emmaus(),
            &completed(&["emmaus-encounter"]),
            &PathConfig::default(),
        );
        assert_eq!(
            states(&view),
            [NodeState::Current, NodeState::Completed, NodeState::Locked]
        );
        assert!(view.connectors.iter().all(|c| !c.active));
    }

    #[test]
    fn nodes_survive_an_unusable_trail_config() {
        let config = PathConfig {
            profiles: Vec::new(),
            ..PathConfig::default()
        };
        let view = JourneyMapView::build(emmaus(), &completed(&["emmaus-start"]), &config);
        assert!(view.trail.points.is_empty());
        assert_eq!(view.nodes.len(), 3);
        assert!(view.nodes.iter().all(|n| n.position.is_none()));
        assert_eq!(
            states(&view),
            [NodeState::Completed, NodeState::Current, NodeState::Locked]
        );
        assert_eq!(view.connectors.len(), 2);
    }

    #[test]
    fn distance_labels_are_kilometers() {
        let view = JourneyMapView::build(emmaus(), &BTreeSet::new(), &PathConfig::default());
        let labels: Vec<String> = view.nodes.iter().map(MapNode::distance_label).collect();
        assert_eq!(labels, ["0.0 km", "5.5 km", "11.0 km"]);
    }
}
