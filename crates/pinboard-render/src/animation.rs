//! Per-node transition values for lift, hover and selection feedback.
//!
//! Values ease toward their 0/1 targets exponentially:
//!
//!   v += (target - v) * (1 - e^(-rate * dt))
//!
//! which is frame-rate independent. A value within [`REST_THRESHOLD`] of its
//! target snaps onto it, so an idle board settles and stops requesting frames.

use pinboard_core::{BoardState, NodeId, TransformKind};
use std::collections::HashMap;
use std::time::Duration;

/// Distance from the target below which a value is considered at rest.
pub const REST_THRESHOLD: f64 = 0.001;

/// Default convergence rate, per second.
pub const DEFAULT_RATE: f64 = 18.0;

/// Transition values of one node, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeAnimation {
    /// Raised while being dragged; drives the drop shadow.
    pub lift: f64,
    pub hover: f64,
    pub selection: f64,
}

impl NodeAnimation {
    fn is_zero(&self) -> bool {
        self.lift == 0.0 && self.hover == 0.0 && self.selection == 0.0
    }
}

fn approach(value: &mut f64, target: f64, alpha: f64) -> bool {
    if (target - *value).abs() < REST_THRESHOLD {
        *value = target;
        return false;
    }
    *value += (target - *value) * alpha;
    if (target - *value).abs() < REST_THRESHOLD {
        *value = target;
    }
    true
}

/// Animation state kept beside the board, outside the document model.
#[derive(Debug, Clone)]
pub struct AnimationState {
    nodes: HashMap<NodeId, NodeAnimation>,
    rate: f64,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationState {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            rate: DEFAULT_RATE,
        }
    }

    /// Use a different convergence rate (per second). Non-positive rates
    /// fall back to the default.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = if rate > 0.0 { rate } else { DEFAULT_RATE };
        self
    }

    /// Current values for a node; nodes without an entry are at rest at zero.
    pub fn get(&self, id: NodeId) -> NodeAnimation {
        self.nodes.get(&id).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Advance every value toward the targets implied by `state`.
    ///
    /// Returns whether anything is still moving, i.e. whether another frame
    /// should be scheduled.
    pub fn tick(&mut self, state: &BoardState, dt: Duration) -> bool {
        self.nodes.retain(|id, _| state.nodes.contains_key(id));

        let lifted: Vec<NodeId> = match &state.interaction.active {
            Some(active) if active.kind == TransformKind::Drag => active.targets.clone(),
            _ => Vec::new(),
        };
        let target_of = |id: NodeId| NodeAnimation {
            lift: if lifted.contains(&id) { 1.0 } else { 0.0 },
            hover: if state.interaction.hovered == Some(id) { 1.0 } else { 0.0 },
            selection: if state.is_selected(id) { 1.0 } else { 0.0 },
        };

        // Nodes that need an entry: everything with a non-zero target.
        let mut candidates: Vec<NodeId> = lifted.clone();
        candidates.extend(state.interaction.hovered);
        candidates.extend(state.selection.iter().copied());
        for id in candidates {
            if state.nodes.contains_key(&id) {
                self.nodes.entry(id).or_default();
            }
        }

        let alpha = 1.0 - (-self.rate * dt.as_secs_f64()).exp();
        let mut moving = false;
        for (id, anim) in self.nodes.iter_mut() {
            let target = target_of(*id);
            moving |= approach(&mut anim.lift, target.lift, alpha);
            moving |= approach(&mut anim.hover, target.hover, alpha);
            moving |= approach(&mut anim.selection, target.selection, alpha);
        }
        self.nodes.retain(|_, anim| !anim.is_zero());
        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Rect;
    use pinboard_core::node::ShapeKind;
    use pinboard_core::{BoardNode, Store};

    const FRAME: Duration = Duration::from_millis(16);

    fn store_with_node() -> (Store, NodeId) {
        let mut store = Store::new();
        let node = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let id = node.id;
        store.add_node(node);
        (store, id)
    }

    #[test]
    fn test_selection_eases_in_and_settles() {
        let (mut store, id) = store_with_node();
        store.set_selection([id]);
        let mut anim = AnimationState::new();

        assert!(anim.tick(store.state(), FRAME));
        let first = anim.get(id).selection;
        let expected = 1.0 - (-DEFAULT_RATE * 0.016f64).exp();
        assert!((first - expected).abs() < 1e-9);

        let mut frames = 0;
        while anim.tick(store.state(), FRAME) {
            frames += 1;
            assert!(frames < 1000, "animation never settled");
        }
        assert!((anim.get(id).selection - 1.0).abs() < f64::EPSILON);
        assert!(anim.get(id).lift.abs() < f64::EPSILON);
    }

    #[test]
    fn test_idle_board_requests_no_frames() {
        let (store, _) = store_with_node();
        let mut anim = AnimationState::new();
        assert!(!anim.tick(store.state(), FRAME));
        assert!(anim.is_empty());
    }

    #[test]
    fn test_deleted_nodes_are_dropped() {
        let (mut store, id) = store_with_node();
        store.set_selection([id]);
        let mut anim = AnimationState::new();
        anim.tick(store.state(), FRAME);
        assert_eq!(anim.len(), 1);

        store.delete_nodes(&[id]);
        anim.tick(store.state(), FRAME);
        assert!(anim.is_empty());
        assert_eq!(anim.get(id), NodeAnimation::default());
    }

    #[test]
    fn test_hover_fades_out() {
        let (mut store, id) = store_with_node();
        store.update_interaction(|i| i.hovered = Some(id));
        let mut anim = AnimationState::new().with_rate(1000.0);
        anim.tick(store.state(), Duration::from_millis(100));
        assert!((anim.get(id).hover - 1.0).abs() < f64::EPSILON);

        store.update_interaction(|i| i.hovered = None);
        anim.tick(store.state(), Duration::from_millis(100));
        assert_eq!(anim.get(id), NodeAnimation::default());
    }
}
