//! Grouping, ungrouping and copies of node subtrees.

use super::Store;
use crate::geometry::union_rects;
use crate::node::{BoardNode, GroupContent, NodeContent, NodeId};
use kurbo::Vec2;
use log::debug;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

impl Store {
    /// Fit every group above a dirty node to the union of its children.
    pub(super) fn refit_groups(&mut self) {
        let mut pending: Vec<NodeId> = self
            .dirty
            .iter()
            .filter_map(|id| self.state.nodes.get(id).and_then(|n| n.parent_id))
            .collect();
        let mut visited = HashSet::new();
        while let Some(group_id) = pending.pop() {
            if !visited.insert(group_id) {
                continue;
            }
            let Some(group) = self.state.nodes.get(&group_id) else {
                continue;
            };
            let bounds = union_rects(
                group
                    .children()
                    .iter()
                    .filter_map(|c| self.state.nodes.get(c))
                    .map(BoardNode::aabb),
            );
            let parent = group.parent_id;
            let Some(bounds) = bounds else {
                continue;
            };
            if group.frame() == bounds && group.rotation == 0.0 {
                continue;
            }
            let stamp = self.clock.now();
            if let Some(group) = self.state.nodes.get_mut(&group_id) {
                group.set_frame(bounds);
                group.rotation = 0.0;
                group.updated_at = stamp;
            }
            self.dirty.insert(group_id);
            pending.extend(parent);
        }
    }

    /// Wrap the selected top-level nodes in a new group.
    ///
    /// The members keep their relative order and are moved directly below
    /// the group, which goes on top of the paint order.
    pub fn group_selection(&mut self) -> Option<NodeId> {
        let members: Vec<NodeId> = self
            .state
            .selected_ids()
            .into_iter()
            .filter(|id| self.state.nodes.get(id).is_some_and(|n| n.parent_id.is_none()))
            .collect();
        if members.len() < 2 {
            debug!("group_selection: need at least two top-level nodes");
            return None;
        }
        let frame = union_rects(members.iter().filter_map(|id| self.state.nodes.get(id)).map(BoardNode::aabb))?;
        self.push_undo();

        let group = BoardNode::new(
            NodeContent::Group(GroupContent {
                children_ids: members.clone(),
                label: None,
            }),
            frame,
        );
        let group_id = group.id;
        for &id in &members {
            if let Some(node) = self.state.nodes.get_mut(&id) {
                node.parent_id = Some(group_id);
            }
            self.touch(id);
        }

        let member_set: HashSet<NodeId> = members.iter().copied().collect();
        let (picked, rest): (Vec<NodeId>, Vec<NodeId>) =
            self.state.order.iter().partition(|id| member_set.contains(*id));
        self.state.order = rest.into_iter().chain(picked).collect();

        debug!("group_selection: {group_id} with {} member(s)", members.len());
        self.batch(|store| {
            store.add_node(group);
            store.reindex();
            store.state.selection = HashSet::from([group_id]);
        });
        Some(group_id)
    }

    /// Dissolve every selected group, selecting the freed children.
    ///
    /// Children of a nested group move up to the enclosing group.
    pub fn ungroup_selection(&mut self) -> Vec<NodeId> {
        let groups: Vec<NodeId> = self
            .state
            .selected_ids()
            .into_iter()
            .filter(|id| self.state.nodes.get(id).is_some_and(BoardNode::is_group))
            .collect();
        if groups.is_empty() {
            return Vec::new();
        }
        self.push_undo();

        let mut freed = Vec::new();
        let mut removed = HashSet::new();
        for group_id in groups {
            let Some(group) = self.state.nodes.remove(&group_id) else {
                continue;
            };
            let parent = group.parent_id;
            let children: Vec<NodeId> = group
                .children()
                .iter()
                .copied()
                .filter(|c| self.state.nodes.contains_key(c))
                .collect();
            for &child in &children {
                if let Some(node) = self.state.nodes.get_mut(&child) {
                    node.parent_id = parent;
                }
                self.touch(child);
                self.dirty.insert(child);
            }
            if let Some(outer) = parent.and_then(|p| self.state.nodes.get_mut(&p)).and_then(|n| n.content.as_group_mut()) {
                outer.children_ids.retain(|c| *c != group_id);
                outer.children_ids.extend(children.iter().copied());
            }
            if let Some(outer) = parent {
                self.touch(outer);
            }
            freed.extend(children);
            removed.insert(group_id);
        }

        self.state.order.retain(|id| !removed.contains(id));
        self.forget(&removed);
        self.reindex();
        self.state.selection = freed.iter().copied().filter(|id| !removed.contains(id)).collect();
        debug!("ungroup_selection: freed {} node(s)", freed.len());
        self.finish();
        freed
    }

    /// Copy the selection (with group contents) and select the copies.
    pub fn duplicate_selection(&mut self) -> Vec<NodeId> {
        let roots = self.state.selection_roots();
        if roots.is_empty() {
            return Vec::new();
        }
        let members: HashSet<NodeId> = self.state.with_descendants(roots).into_iter().collect();
        let nodes: Vec<BoardNode> = self
            .state
            .ordered_nodes()
            .filter(|n| members.contains(&n.id))
            .cloned()
            .collect();
        let offset = self.config.duplicate_offset;
        self.paste_nodes(nodes, Vec2::new(offset, offset))
    }

    /// Insert copies of `nodes` with fresh ids, shifted by `offset`.
    ///
    /// Parent links, group children and line bindings are remapped among the
    /// copies; references to nodes outside the set are dropped. The top-level
    /// copies become the selection.
    pub fn paste_nodes(&mut self, nodes: Vec<BoardNode>, offset: Vec2) -> Vec<NodeId> {
        if nodes.is_empty() {
            return Vec::new();
        }
        let ids: HashMap<NodeId, NodeId> = nodes.iter().map(|n| (n.id, Uuid::new_v4())).collect();

        let copies: Vec<BoardNode> = nodes
            .into_iter()
            .map(|mut node| {
                node.id = ids[&node.id];
                node.parent_id = node.parent_id.and_then(|p| ids.get(&p).copied());
                match &mut node.content {
                    NodeContent::Group(group) => {
                        group.children_ids = group.children_ids.iter().filter_map(|c| ids.get(c).copied()).collect();
                    }
                    NodeContent::Line(line) => {
                        line.start_binding = line.start_binding.and_then(|mut b| {
                            b.node_id = *ids.get(&b.node_id)?;
                            Some(b)
                        });
                        line.end_binding = line.end_binding.and_then(|mut b| {
                            b.node_id = *ids.get(&b.node_id)?;
                            Some(b)
                        });
                    }
                    _ => {}
                }
                node.translate(offset);
                node.collapsed = false;
                node.created_at = 0;
                node.updated_at = 0;
                node
            })
            .collect();

        let new_ids: Vec<NodeId> = copies.iter().map(|n| n.id).collect();
        let roots: Vec<NodeId> = copies.iter().filter(|n| n.parent_id.is_none()).map(|n| n.id).collect();
        debug!("paste_nodes: {} node(s)", copies.len());

        self.push_undo();
        self.batch(|store| {
            for copy in copies {
                store.add_node(copy);
            }
            store.set_selection(roots);
        });
        new_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LineBinding, ShapeKind, Side};
    use crate::store::NodePatch;
    use kurbo::{Point, Rect};

    const EPS: f64 = 1e-9;

    fn add(store: &mut Store, rect: Rect) -> NodeId {
        let node = BoardNode::shape(ShapeKind::Rectangle, rect);
        let id = node.id;
        store.add_node(node);
        id
    }

    #[test]
    fn test_group_wraps_members() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let other = add(&mut store, Rect::new(500.0, 500.0, 550.0, 550.0));
        let b = add(&mut store, Rect::new(100.0, 100.0, 150.0, 180.0));
        store.set_selection([a, b]);
        let group = store.group_selection().unwrap();

        let state = store.state();
        assert_eq!(state.order, vec![other, a, b, group]);
        assert_eq!(state.nodes[&group].frame(), Rect::new(0.0, 0.0, 150.0, 180.0));
        assert_eq!(state.nodes[&a].parent_id, Some(group));
        assert_eq!(state.selection, HashSet::from([group]));
        assert!(state.check_invariants());
    }

    #[test]
    fn test_group_needs_two_top_level_nodes() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        store.set_selection([a]);
        assert!(store.group_selection().is_none());
        assert!(!store.can_undo());
    }

    #[test]
    fn test_ungroup_restores_members() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = add(&mut store, Rect::new(100.0, 100.0, 150.0, 150.0));
        store.set_selection([a, b]);
        let group = store.group_selection().unwrap();
        let freed = store.ungroup_selection();

        let state = store.state();
        assert_eq!(freed, vec![a, b]);
        assert!(!state.nodes.contains_key(&group));
        assert_eq!(state.nodes[&a].parent_id, None);
        assert_eq!(state.selection, HashSet::from([a, b]));
        assert_eq!(state.order, vec![a, b]);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_group_refits_after_child_moves() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = add(&mut store, Rect::new(100.0, 100.0, 150.0, 150.0));
        store.set_selection([a, b]);
        let group = store.group_selection().unwrap();
        store.update_node(b, NodePatch::position(300.0, 100.0));
        assert_eq!(store.state().nodes[&group].frame(), Rect::new(0.0, 0.0, 350.0, 150.0));
    }

    #[test]
    fn test_deleting_group_detaches_children() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = add(&mut store, Rect::new(100.0, 100.0, 150.0, 150.0));
        store.set_selection([a, b]);
        let group = store.group_selection().unwrap();
        store.delete_nodes(&[group]);
        let state = store.state();
        assert_eq!(state.len(), 2);
        assert_eq!(state.nodes[&b].parent_id, None);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_duplicate_remaps_internal_references() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = add(&mut store, Rect::new(200.0, 0.0, 250.0, 50.0));
        let mut line = BoardNode::line(Point::new(50.0, 25.0), Point::new(200.0, 25.0));
        if let Some(content) = line.content.as_line_mut() {
            content.start_binding = Some(LineBinding { node_id: a, side: Side::Right });
            content.end_binding = Some(LineBinding { node_id: b, side: Side::Left });
        }
        let line_id = line.id;
        store.add_node(line);

        store.set_selection([a, line_id]);
        let copies = store.duplicate_selection();
        assert_eq!(copies.len(), 2);
        let state = store.state();
        assert_eq!(state.len(), 5);

        let copied_line = copies.iter().filter_map(|id| state.nodes[id].content.as_line()).next().unwrap();
        let copied_box = copies.iter().copied().find(|id| !state.nodes[id].is_line()).unwrap();
        assert_eq!(copied_line.start_binding.map(|b| b.node_id), Some(copied_box));
        assert!(copied_line.end_binding.is_none());
        assert!((state.nodes[&copied_box].x - 20.0).abs() < EPS);
        assert_eq!(state.selection.len(), 2);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_duplicate_group_copies_children() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 50.0, 50.0));
        let b = add(&mut store, Rect::new(100.0, 100.0, 150.0, 150.0));
        store.set_selection([a, b]);
        store.group_selection();
        let copies = store.duplicate_selection();
        assert_eq!(copies.len(), 3);
        let state = store.state();
        let new_group = state.selected_ids()[0];
        assert_eq!(state.nodes[&new_group].children().len(), 2);
        assert!(state.nodes[&new_group].children().iter().all(|c| copies.contains(c)));
        assert!(state.check_invariants());
    }
}
