//! Z-order, alignment, distribution and rotation of the selection.

use super::{NodePatch, Store};
use crate::geometry::{axis_vec, center_on, rotate_point, union_rects, Axis};
use crate::node::{BoardNode, NodeContent, NodeId};
use kurbo::{Rect, Vec2};
use log::debug;
use std::collections::HashSet;

/// Edge or center line that [`Store::align_selected`] lines nodes up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignEdge {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl AlignEdge {
    fn delta(self, bounds: Rect, rect: Rect) -> Vec2 {
        match self {
            AlignEdge::Left => Vec2::new(bounds.x0 - rect.x0, 0.0),
            AlignEdge::Center => Vec2::new(bounds.center().x - rect.center().x, 0.0),
            AlignEdge::Right => Vec2::new(bounds.x1 - rect.x1, 0.0),
            AlignEdge::Top => Vec2::new(0.0, bounds.y0 - rect.y0),
            AlignEdge::Middle => Vec2::new(0.0, bounds.center().y - rect.center().y),
            AlignEdge::Bottom => Vec2::new(0.0, bounds.y1 - rect.y1),
        }
    }
}

/// Patch moving `node` by `delta` from its current position.
pub(crate) fn translate_patch(node: &BoardNode, delta: Vec2) -> NodePatch {
    match &node.content {
        NodeContent::Line(line) => {
            let mut line = line.clone();
            line.translate(delta);
            NodePatch::content(NodeContent::Line(line))
        }
        _ => NodePatch::position(node.x + delta.x, node.y + delta.y),
    }
}

/// Patch rotating `node` by `angle` about `pivot`.
///
/// Boxes orbit the pivot and gain `angle` of rotation; lines rotate their
/// endpoints. Groups are left alone and refit around their children.
pub(crate) fn rotate_patch(node: &BoardNode, pivot: kurbo::Point, angle: f64) -> NodePatch {
    match &node.content {
        NodeContent::Group(_) => NodePatch::default(),
        NodeContent::Line(line) => {
            let mut line = line.clone();
            line.start = rotate_point(line.start, pivot, angle);
            line.end = rotate_point(line.end, pivot, angle);
            NodePatch::content(NodeContent::Line(line))
        }
        _ => {
            let center = rotate_point(node.center(), pivot, angle);
            NodePatch::position(center.x - node.w / 2.0, center.y - node.h / 2.0).with_rotation(node.rotation + angle)
        }
    }
}

impl Store {
    /// Selected ids plus group descendants, as a set.
    fn selection_closure(&self) -> HashSet<NodeId> {
        self.state.with_descendants(self.state.selected_ids()).into_iter().collect()
    }

    fn reorder(&mut self, f: impl FnOnce(&mut Vec<NodeId>, &HashSet<NodeId>)) {
        let moving = self.selection_closure();
        if moving.is_empty() {
            return;
        }
        let mut order = self.state.order.clone();
        f(&mut order, &moving);
        if order == self.state.order {
            return;
        }
        self.push_undo();
        self.state.order = order;
        self.reindex();
        self.finish();
    }

    /// Move the selection above everything else, keeping its relative order.
    pub fn bring_to_front(&mut self) {
        self.reorder(|order, moving| {
            let (picked, rest): (Vec<NodeId>, Vec<NodeId>) = order.iter().partition(|id| moving.contains(*id));
            *order = rest.into_iter().chain(picked).collect();
        });
    }

    /// Move the selection below everything else, keeping its relative order.
    pub fn send_to_back(&mut self) {
        self.reorder(|order, moving| {
            let (picked, rest): (Vec<NodeId>, Vec<NodeId>) = order.iter().partition(|id| moving.contains(*id));
            *order = picked.into_iter().chain(rest).collect();
        });
    }

    /// Swap each selected node with the unselected node directly above it.
    pub fn bring_forward(&mut self) {
        self.reorder(|order, moving| {
            for i in (0..order.len().saturating_sub(1)).rev() {
                if moving.contains(&order[i]) && !moving.contains(&order[i + 1]) {
                    order.swap(i, i + 1);
                }
            }
        });
    }

    /// Swap each selected node with the unselected node directly below it.
    pub fn send_backward(&mut self) {
        self.reorder(|order, moving| {
            for i in 1..order.len() {
                if moving.contains(&order[i]) && !moving.contains(&order[i - 1]) {
                    order.swap(i, i - 1);
                }
            }
        });
    }

    /// Move a node and its whole subtree.
    fn translate_subtree(&mut self, id: NodeId, delta: Vec2) {
        let ids = self.state.with_descendants([id]);
        let patches: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.state.nodes.get(&id))
            .map(|node| (node.id, translate_patch(node, delta)))
            .collect();
        self.update_nodes(patches);
    }

    /// Unlocked selection roots with their bounding boxes.
    fn movable_roots(&self) -> Vec<(NodeId, Rect)> {
        self.state
            .selection_roots()
            .into_iter()
            .filter_map(|id| self.state.nodes.get(&id))
            .filter(|n| !n.locked)
            .map(|n| (n.id, n.aabb()))
            .collect()
    }

    /// Line the selection up on a shared edge or center of its bounds.
    pub fn align_selected(&mut self, edge: AlignEdge) {
        let roots = self.state.selection_roots();
        if roots.len() < 2 {
            return;
        }
        let Some(bounds) = union_rects(roots.iter().filter_map(|id| self.state.nodes.get(id)).map(BoardNode::aabb)) else {
            return;
        };
        let moves: Vec<(NodeId, Vec2)> = self
            .movable_roots()
            .into_iter()
            .map(|(id, rect)| (id, edge.delta(bounds, rect)))
            .filter(|(_, delta)| *delta != Vec2::ZERO)
            .collect();
        if moves.is_empty() {
            return;
        }
        debug!("align_selected: {edge:?} on {} node(s)", moves.len());
        self.push_undo();
        self.batch(|store| {
            for (id, delta) in moves {
                store.translate_subtree(id, delta);
            }
        });
    }

    /// Space the selection's centers evenly along `axis`.
    ///
    /// Needs at least three unlocked nodes; the outermost two stay put.
    pub fn distribute_selected(&mut self, axis: Axis) {
        let mut members = self.movable_roots();
        if members.len() < 3 {
            return;
        }
        members.sort_by(|(_, a), (_, b)| center_on(*a, axis).total_cmp(&center_on(*b, axis)));
        let first = center_on(members[0].1, axis);
        let last = center_on(members[members.len() - 1].1, axis);
        let step = (last - first) / (members.len() - 1) as f64;

        debug!("distribute_selected: {axis:?} over {} node(s)", members.len());
        self.push_undo();
        let inner = members.len() - 1;
        self.batch(|store| {
            for (i, (id, rect)) in members.into_iter().enumerate().take(inner).skip(1) {
                let target = first + step * i as f64;
                let delta = target - center_on(rect, axis);
                if delta != 0.0 {
                    store.translate_subtree(id, axis_vec(axis, delta));
                }
            }
        });
    }

    /// Rotate every unlocked selection root by `degrees` about its own center.
    pub fn rotate_selected(&mut self, degrees: f64) {
        let roots: Vec<NodeId> = self.movable_roots().into_iter().map(|(id, _)| id).collect();
        if roots.is_empty() || degrees == 0.0 {
            return;
        }
        let angle = degrees.to_radians();
        let mut patches = Vec::new();
        for id in roots {
            let Some(node) = self.state.nodes.get(&id) else {
                continue;
            };
            let pivot = node.aabb().center();
            for member in self.state.with_descendants([id]) {
                if let Some(n) = self.state.nodes.get(&member) {
                    patches.push((member, rotate_patch(n, pivot, angle)));
                }
            }
        }
        self.push_undo();
        self.update_nodes(patches);
    }
}
