//! Persisted board snapshots and single-node records.

use crate::config::EditorConfig;
use crate::error::{BoardError, BoardResult};
use crate::node::{BoardNode, NodeId};
use crate::state::BoardState;
use crate::store::Store;
use crate::viewport::Viewport;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a whole board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub version: u32,
    pub nodes: Vec<BoardNode>,
    #[serde(default)]
    pub order: Vec<NodeId>,
    #[serde(default)]
    pub viewport: Viewport,
}

impl BoardSnapshot {
    /// Capture the persisted parts of a state (interaction and selection are dropped).
    pub fn capture(state: &BoardState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            nodes: state.ordered_nodes().cloned().collect(),
            order: state.order.clone(),
            viewport: state.viewport,
        }
    }

    /// Build a consistent state from the snapshot.
    ///
    /// Missing or unknown order entries are repaired (unlisted nodes go on top
    /// by `zIndex`) and dangling parent or child links are cleared.
    pub fn into_state(self) -> BoardResult<BoardState> {
        if self.version > SNAPSHOT_VERSION {
            return Err(BoardError::UnsupportedVersion(self.version));
        }
        let mut nodes: HashMap<NodeId, BoardNode> = HashMap::with_capacity(self.nodes.len());
        for node in self.nodes {
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(BoardError::DuplicateNode(id));
            }
        }

        let mut seen = HashSet::new();
        let mut order: Vec<NodeId> = self
            .order
            .into_iter()
            .filter(|id| nodes.contains_key(id) && seen.insert(*id))
            .collect();
        let mut unlisted: Vec<&BoardNode> = nodes.values().filter(|n| !seen.contains(&n.id)).collect();
        if !unlisted.is_empty() {
            warn!("snapshot order is missing {} node(s)", unlisted.len());
            unlisted.sort_by_key(|n| (n.z_index, n.created_at));
            order.extend(unlisted.into_iter().map(|n| n.id));
        }

        let ids: HashSet<NodeId> = nodes.keys().copied().collect();
        for node in nodes.values_mut() {
            if node.parent_id.is_some_and(|p| !ids.contains(&p)) {
                warn!("node {} has a dangling parent", node.id);
                node.parent_id = None;
            }
            if let Some(group) = node.content.as_group_mut() {
                group.children_ids.retain(|c| ids.contains(c));
            }
            if let Some(line) = node.content.as_line_mut() {
                if line.start_binding.is_some_and(|b| !ids.contains(&b.node_id)) {
                    line.start_binding = None;
                }
                if line.end_binding.is_some_and(|b| !ids.contains(&b.node_id)) {
                    line.end_binding = None;
                }
            }
            node.sync_line_frame();
        }
        for (i, id) in order.iter().enumerate() {
            if let Some(node) = nodes.get_mut(id) {
                node.z_index = i;
            }
        }

        Ok(BoardState {
            nodes,
            order,
            viewport: self.viewport,
            ..Default::default()
        })
    }
}

/// Serialize a single node to its flat record.
pub fn node_to_json(node: &BoardNode) -> BoardResult<String> {
    Ok(serde_json::to_string(node)?)
}

/// Parse a single flat node record.
pub fn node_from_json(json: &str) -> BoardResult<BoardNode> {
    Ok(serde_json::from_str(json)?)
}

impl Store {
    /// Serialize the document (nodes, order and viewport) to pretty JSON.
    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(&BoardSnapshot::capture(self.state()))?)
    }

    /// Load a document previously produced by [`Store::to_json`].
    pub fn from_json(json: &str, config: EditorConfig) -> BoardResult<Self> {
        let snapshot: BoardSnapshot = serde_json::from_str(json)?;
        Ok(Store::from_state(snapshot.into_state()?, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BoardNode, ShapeKind};
    use kurbo::Rect;

    #[test]
    fn test_store_json_preserves_order_and_viewport() {
        let mut store = Store::new();
        let a = BoardNode::card(Rect::new(0.0, 0.0, 200.0, 120.0), "Plan");
        let b = BoardNode::shape(ShapeKind::Diamond, Rect::new(300.0, 0.0, 380.0, 80.0));
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        store.pan_by(kurbo::Vec2::new(40.0, -10.0));
        store.set_selection([a_id]);

        let json = store.to_json().unwrap();
        let restored = Store::from_json(&json, EditorConfig::default()).unwrap();
        let state = restored.state();
        assert_eq!(state.order, vec![a_id, b_id]);
        assert_eq!(state.nodes[&a_id], store.state().nodes[&a_id]);
        assert!((state.viewport.x - 40.0).abs() < f64::EPSILON);
        assert!(state.selection.is_empty());
        assert!(state.check_invariants());
    }

    #[test]
    fn test_missing_order_is_repaired() {
        let mut a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 50.0, 50.0));
        let mut b = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 50.0, 50.0));
        a.z_index = 1;
        b.z_index = 0;
        let (a_id, b_id) = (a.id, b.id);
        let snapshot = BoardSnapshot {
            version: SNAPSHOT_VERSION,
            nodes: vec![a, b],
            order: vec![uuid::Uuid::new_v4()],
            viewport: Viewport::default(),
        };
        let state = snapshot.into_state().unwrap();
        assert_eq!(state.order, vec![b_id, a_id]);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 50.0, 50.0));
        let snapshot = BoardSnapshot {
            version: SNAPSHOT_VERSION,
            nodes: vec![a.clone(), a],
            order: Vec::new(),
            viewport: Viewport::default(),
        };
        assert!(matches!(snapshot.into_state(), Err(BoardError::DuplicateNode(_))));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let json = r#"{ "version": 99, "nodes": [] }"#;
        let snapshot: BoardSnapshot = serde_json::from_str(json).unwrap();
        assert!(matches!(snapshot.into_state(), Err(BoardError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_dangling_parent_is_cleared() {
        let a = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 50.0, 50.0)).with_parent(uuid::Uuid::new_v4());
        let id = a.id;
        let snapshot = BoardSnapshot {
            version: SNAPSHOT_VERSION,
            nodes: vec![a],
            order: vec![id],
            viewport: Viewport::default(),
        };
        let state = snapshot.into_state().unwrap();
        assert_eq!(state.nodes[&id].parent_id, None);
    }

    #[test]
    fn test_node_record_is_flat() {
        let node = BoardNode::card(Rect::new(0.0, 0.0, 100.0, 80.0), "Hello");
        let json = node_to_json(&node).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "card");
        assert_eq!(value["content"]["title"], "Hello");
        assert_eq!(value["w"], 100.0);
        assert_eq!(node_from_json(&json).unwrap(), node);
    }
}
