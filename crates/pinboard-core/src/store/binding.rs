//! Keeping line endpoints attached to the nodes they are bound to.

use super::Store;
use crate::node::{LineBinding, NodeContent, NodeId};
use crate::state::BoardState;
use kurbo::Point;
use log::trace;
use std::collections::HashSet;

/// World position a binding resolves to, or `None` if its target is gone
/// or cannot carry bindings.
pub fn bound_point(state: &BoardState, binding: &LineBinding) -> Option<Point> {
    state
        .nodes
        .get(&binding.node_id)
        .filter(|target| !target.is_line())
        .map(|target| target.side_midpoint(binding.side))
}

impl Store {
    /// Move bound endpoints of every line touching a dirty node onto the
    /// current side midpoint of its target.
    ///
    /// Rewritten lines join the dirty set so their groups refit. Returns
    /// whether any line moved.
    pub(super) fn rebind_lines(&mut self) -> bool {
        if self.dirty.is_empty() {
            return false;
        }
        let mut updates = Vec::new();
        for node in self.state.nodes.values() {
            let Some(line) = node.content.as_line() else {
                continue;
            };
            let line_moved = self.dirty.contains(&node.id);
            let mut next = line.clone();
            let mut changed = false;
            for (end, binding) in line.bindings() {
                if !line_moved && !self.dirty.contains(&binding.node_id) {
                    continue;
                }
                match bound_point(&self.state, &binding) {
                    Some(point) => {
                        if line.point(end) != point {
                            next.set_point(end, point);
                            changed = true;
                        }
                    }
                    None => {
                        next.clear_binding(end);
                        changed = true;
                    }
                }
            }
            if changed {
                updates.push((node.id, next));
            }
        }

        let moved = !updates.is_empty();
        for (id, line) in updates {
            trace!("rebind line {id}");
            let stamp = self.clock.now();
            if let Some(node) = self.state.nodes.get_mut(&id) {
                node.content = NodeContent::Line(line);
                node.sync_line_frame();
                node.updated_at = stamp;
            }
            self.dirty.insert(id);
        }
        moved
    }

    /// Clear every binding that points at a removed node.
    pub(super) fn drop_bindings_to(&mut self, removed: &HashSet<NodeId>) {
        let affected: Vec<NodeId> = self
            .state
            .nodes
            .values()
            .filter(|n| n.content.as_line().is_some_and(|l| removed.iter().any(|&r| l.is_bound_to(r))))
            .map(|n| n.id)
            .collect();
        for id in affected {
            let stamp = self.clock.now();
            if let Some(line) = self.state.nodes.get_mut(&id).and_then(|n| {
                n.updated_at = stamp;
                n.content.as_line_mut()
            }) {
                if line.start_binding.is_some_and(|b| removed.contains(&b.node_id)) {
                    line.start_binding = None;
                }
                if line.end_binding.is_some_and(|b| removed.contains(&b.node_id)) {
                    line.end_binding = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BoardNode, LineContent, LineEnd, ShapeKind, Side};
    use crate::store::NodePatch;
    use kurbo::Rect;

    fn bound_line(store: &mut Store, a: NodeId, b: NodeId) -> NodeId {
        let state = store.state();
        let start = state.nodes[&a].side_midpoint(Side::Right);
        let end = state.nodes[&b].side_midpoint(Side::Left);
        let mut line = BoardNode::line(start, end);
        if let Some(content) = line.content.as_line_mut() {
            content.start_binding = Some(LineBinding { node_id: a, side: Side::Right });
            content.end_binding = Some(LineBinding { node_id: b, side: Side::Left });
        }
        let id = line.id;
        store.add_node(line);
        id
    }

    fn line_of(store: &Store, id: NodeId) -> LineContent {
        store.state().nodes[&id].content.as_line().cloned().unwrap()
    }

    #[test]
    fn test_moving_target_moves_endpoint() {
        let mut store = Store::new();
        let a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = BoardNode::shape(ShapeKind::Rectangle, Rect::new(300.0, 0.0, 400.0, 100.0));
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        let line_id = bound_line(&mut store, a_id, b_id);

        store.update_node(b_id, NodePatch::position(300.0, 200.0));
        let line = line_of(&store, line_id);
        assert_eq!(line.start, Point::new(100.0, 50.0));
        assert_eq!(line.end, Point::new(300.0, 250.0));
        assert_eq!(store.state().nodes[&line_id].frame(), Rect::new(100.0, 50.0, 300.0, 250.0));
    }

    #[test]
    fn test_rotated_target_uses_rotated_midpoint() {
        let mut store = Store::new();
        let a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = BoardNode::shape(ShapeKind::Rectangle, Rect::new(300.0, 0.0, 400.0, 100.0));
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        let line_id = bound_line(&mut store, a_id, b_id);

        store.update_node(b_id, NodePatch::rotation(std::f64::consts::FRAC_PI_2));
        let end = line_of(&store, line_id).end;
        // The left side now faces up.
        assert!((end.x - 350.0).abs() < 1e-9);
        assert!((end.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_deleting_target_clears_binding() {
        let mut store = Store::new();
        let a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = BoardNode::shape(ShapeKind::Rectangle, Rect::new(300.0, 0.0, 400.0, 100.0));
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        let line_id = bound_line(&mut store, a_id, b_id);

        store.delete_nodes(&[b_id]);
        let line = line_of(&store, line_id);
        assert!(line.binding(LineEnd::End).is_none());
        assert!(line.binding(LineEnd::Start).is_some());
        assert_eq!(line.end, Point::new(300.0, 50.0));
    }

    #[test]
    fn test_bound_point_rejects_lines() {
        let mut state = BoardState::new();
        let line = BoardNode::line(Point::ZERO, Point::new(100.0, 0.0));
        let binding = LineBinding { node_id: line.id, side: Side::Top };
        state.order.push(line.id);
        state.nodes.insert(line.id, line);
        assert_eq!(bound_point(&state, &binding), None);
    }
}
