//! The board document and its read-only queries.

use crate::geometry::{rects_overlap, union_rects};
use crate::interaction::ToolKind;
use crate::node::{BoardNode, NodeId, TextField};
use crate::snap::Guide;
use crate::viewport::Viewport;
use kurbo::{Point, Rect};
use std::collections::{HashMap, HashSet};

/// Creation draft preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub tool: ToolKind,
    pub start: Point,
    pub current: Point,
}

impl Draft {
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}

/// Kind of transform being applied by the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Drag,
    Resize,
    Rotate,
}

/// Nodes targeted by an in-flight transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTransform {
    pub kind: TransformKind,
    pub targets: Vec<NodeId>,
    /// Current rotation of the target box, for rotation hints.
    pub angle: Option<f64>,
}

/// Field currently open for inline editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub node_id: NodeId,
    pub field: TextField,
}

/// Ephemeral, non-persisted gesture feedback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionState {
    pub marquee: Option<Rect>,
    pub draft: Option<Draft>,
    pub active: Option<ActiveTransform>,
    pub editing: Option<EditTarget>,
    pub hovered: Option<NodeId>,
    pub guides: Vec<Guide>,
    /// Focus-mode target.
    pub focus: Option<NodeId>,
}

/// The whole document plus viewport and interaction feedback.
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    pub nodes: HashMap<NodeId, BoardNode>,
    /// Paint order, bottom first. Always a permutation of `nodes`' keys.
    pub order: Vec<NodeId>,
    pub selection: HashSet<NodeId>,
    pub viewport: Viewport,
    pub interaction: InteractionState,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&BoardNode> {
        self.nodes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in paint order, bottom first.
    pub fn ordered_nodes(&self) -> impl DoubleEndedIterator<Item = &BoardNode> + '_ {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Nodes in paint order, skipping collapsed ones.
    pub fn visible_nodes(&self) -> impl DoubleEndedIterator<Item = &BoardNode> + '_ {
        self.ordered_nodes().filter(|n| !n.collapsed)
    }

    pub fn collapsed_nodes(&self) -> impl Iterator<Item = &BoardNode> + '_ {
        self.ordered_nodes().filter(|n| n.collapsed)
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected nodes in paint order.
    pub fn selected_nodes(&self) -> Vec<&BoardNode> {
        self.ordered_nodes().filter(|n| self.selection.contains(&n.id)).collect()
    }

    /// Selected ids in paint order.
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.order.iter().copied().filter(|id| self.selection.contains(id)).collect()
    }

    /// Top-most visible node under a world point.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.visible_nodes().rev().find(|n| n.contains_point(point)).map(|n| n.id)
    }

    /// Top-most visible node under a world point satisfying `filter`.
    pub fn node_at_where(&self, point: Point, filter: impl Fn(&BoardNode) -> bool) -> Option<NodeId> {
        self.visible_nodes()
            .rev()
            .find(|n| filter(n) && n.contains_point(point))
            .map(|n| n.id)
    }

    /// Visible nodes whose bounding box overlaps `rect`, in paint order.
    pub fn nodes_in_rect(&self, rect: Rect) -> Vec<NodeId> {
        self.visible_nodes().filter(|n| rects_overlap(n.aabb(), rect)).map(|n| n.id).collect()
    }

    /// All descendants of a group, depth first. Cycles are ignored.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            for &child in node.children() {
                if self.nodes.contains_key(&child) && seen.insert(child) {
                    out.push(child);
                    stack.push(child);
                }
            }
        }
        out
    }

    /// `ids` plus every descendant of any group among them, without duplicates.
    pub fn with_descendants(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in ids {
            if !self.nodes.contains_key(&id) {
                continue;
            }
            if seen.insert(id) {
                out.push(id);
            }
            for d in self.descendants(id) {
                if seen.insert(d) {
                    out.push(d);
                }
            }
        }
        out
    }

    /// Whether `id` lies inside the group `ancestor` at any depth.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|n| n.parent_id);
        let mut hops = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            hops += 1;
            if hops > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(&parent).and_then(|n| n.parent_id);
        }
        false
    }

    /// Selected ids with any id dropped whose ancestor group is also selected.
    pub fn selection_roots(&self) -> Vec<NodeId> {
        let selected = self.selected_ids();
        selected
            .iter()
            .copied()
            .filter(|&id| !selected.iter().any(|&other| other != id && self.is_descendant_of(id, other)))
            .collect()
    }

    /// Union of the selected nodes' bounding boxes.
    pub fn selection_bounds(&self) -> Option<Rect> {
        union_rects(self.selected_nodes().into_iter().map(BoardNode::aabb))
    }

    /// Union of all visible nodes' bounding boxes.
    pub fn bounds(&self) -> Option<Rect> {
        union_rects(self.visible_nodes().map(BoardNode::aabb))
    }

    /// Check the order/zIndex and selection invariants.
    pub fn check_invariants(&self) -> bool {
        if self.order.len() != self.nodes.len() {
            return false;
        }
        let unique: HashSet<_> = self.order.iter().collect();
        if unique.len() != self.order.len() {
            return false;
        }
        let ordered_ok = self
            .order
            .iter()
            .enumerate()
            .all(|(i, id)| self.nodes.get(id).is_some_and(|n| n.z_index == i));
        ordered_ok && self.selection.iter().all(|id| self.nodes.contains_key(id))
    }
}
