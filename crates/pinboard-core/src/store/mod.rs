//! Document store: the single owner of a board's state.
//!
//! Every mutation is synchronous and atomic from the caller's point of view:
//! geometry changes cascade to bound lines and parent groups, then subscribers
//! are notified once. Invalid input (unknown ids, too few nodes) is ignored.

mod arrange;
mod binding;
mod clock;
mod group;
mod history;
mod patch;

pub use arrange::AlignEdge;
pub(crate) use arrange::{rotate_patch, translate_patch};
pub use binding::bound_point;
pub use patch::NodePatch;

use crate::config::EditorConfig;
use crate::node::{BoardNode, NodeId};
use crate::state::{BoardState, InteractionState};
use clock::Clock;
use history::{History, Snapshot};
use kurbo::{Point, Size, Vec2};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Upper bound on refit/rebind rounds per batch; a line bound to its own
/// group would otherwise chase the group's frame forever.
const MAX_CASCADE_PASSES: usize = 8;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&BoardState)>;

pub struct Store {
    state: BoardState,
    config: EditorConfig,
    clock: Clock,
    history: History,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    /// Nodes whose frame changed since the last cascade.
    dirty: HashSet<NodeId>,
    batch_depth: usize,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("nodes", &self.state.nodes.len())
            .field("selection", &self.state.selection.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            state: BoardState::new(),
            history: History::new(config.max_undo_history),
            config,
            clock: Clock::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            dirty: HashSet::new(),
            batch_depth: 0,
        }
    }

    /// Adopt an existing state, e.g. one restored from a snapshot.
    pub fn from_state(mut state: BoardState, config: EditorConfig) -> Self {
        let mut store = Self::with_config(config);
        for node in state.nodes.values() {
            store.clock.observe(node.updated_at.max(node.created_at));
        }
        state.selection.retain(|id| state.nodes.get(id).is_some_and(|n| !n.collapsed));
        store.state = state;
        store.reindex();
        store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Read-only view of the current state.
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> BoardState {
        self.state.clone()
    }

    /// Register a listener called after every mutation batch.
    pub fn subscribe(&mut self, listener: impl FnMut(&BoardState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    /// Run several mutations with a single cascade and notification at the end.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Store) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        self.finish();
        result
    }

    fn finish(&mut self) {
        if self.batch_depth > 0 {
            return;
        }
        // Refitting a group can move lines bound to it, and rebinding a line
        // can grow the group holding it.
        self.refit_groups();
        for _ in 0..MAX_CASCADE_PASSES {
            if !self.rebind_lines() {
                break;
            }
            self.refit_groups();
        }
        self.dirty.clear();
        self.notify();
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, listener) in self.listeners.iter_mut() {
            listener(state);
        }
    }

    fn touch(&mut self, id: NodeId) {
        let stamp = self.clock.now();
        if let Some(node) = self.state.nodes.get_mut(&id) {
            node.updated_at = stamp;
        }
    }

    /// Keep every `zIndex` equal to its position in `order`.
    fn reindex(&mut self) {
        let mut stamp = None;
        for (i, id) in self.state.order.iter().enumerate() {
            if let Some(node) = self.state.nodes.get_mut(id) {
                if node.z_index != i {
                    node.z_index = i;
                    node.updated_at = *stamp.get_or_insert_with(|| self.clock.now());
                }
            }
        }
    }

    /// Clamp geometry the same way every write path does.
    fn normalize(&self, node: &mut BoardNode) {
        if node.is_line() {
            node.sync_line_frame();
        } else {
            node.w = node.w.max(self.config.min_node_size);
            node.h = node.h.max(self.config.min_node_size);
        }
    }

    /// Drop group links of an incoming record that point at nothing, and
    /// make the remaining links two-way.
    fn link_remote(&mut self, node: &mut BoardNode) {
        let id = node.id;
        let nodes = &self.state.nodes;
        if node
            .parent_id
            .is_some_and(|p| p == id || !nodes.get(&p).is_some_and(BoardNode::is_group))
        {
            debug!("apply_remote: {id} has no parent group, detaching");
            node.parent_id = None;
        }
        if let Some(group) = node.content.as_group_mut() {
            // Children already claimed by another group stay where they are.
            group.children_ids.retain(|c| {
                *c != id && nodes.get(c).is_some_and(|n| n.parent_id.is_none_or(|p| p == id))
            });
        }
        let previous = nodes.get(&id).and_then(|n| n.parent_id).filter(|p| node.parent_id != Some(*p));
        let released: Vec<NodeId> = nodes
            .get(&id)
            .map(|local| local.children().iter().copied().filter(|c| !node.children().contains(c)).collect())
            .unwrap_or_default();
        for child in released {
            if let Some(child_node) = self.state.nodes.get_mut(&child) {
                child_node.parent_id = None;
            }
        }
        if let Some(group) = previous.and_then(|p| self.state.nodes.get_mut(&p)).and_then(|n| n.content.as_group_mut()) {
            group.children_ids.retain(|c| *c != id);
            if let Some(&survivor) = group.children_ids.first() {
                self.dirty.insert(survivor);
            }
        }
        for &child in node.children() {
            if let Some(child_node) = self.state.nodes.get_mut(&child) {
                child_node.parent_id = Some(id);
            }
            self.dirty.insert(child);
        }
        let Some(parent) = node.parent_id else {
            return;
        };
        if let Some(group) = self.state.nodes.get_mut(&parent).and_then(|n| n.content.as_group_mut()) {
            if !group.children_ids.contains(&id) {
                group.children_ids.push(id);
            }
        }
    }

    /// Clear interaction and selection references to removed nodes.
    fn forget(&mut self, removed: &HashSet<NodeId>) {
        self.state.selection.retain(|id| !removed.contains(id));
        let interaction = &mut self.state.interaction;
        if interaction.hovered.is_some_and(|id| removed.contains(&id)) {
            interaction.hovered = None;
        }
        if interaction.focus.is_some_and(|id| removed.contains(&id)) {
            interaction.focus = None;
        }
        if interaction.editing.as_ref().is_some_and(|e| removed.contains(&e.node_id)) {
            interaction.editing = None;
        }
        if let Some(active) = interaction.active.as_mut() {
            active.targets.retain(|id| !removed.contains(id));
            if active.targets.is_empty() {
                interaction.active = None;
            }
        }
        self.drop_bindings_to(removed);
    }

    // ----- nodes -----

    /// Insert a node on top of the paint order. Duplicate ids are ignored.
    pub fn add_node(&mut self, mut node: BoardNode) -> bool {
        if self.state.nodes.contains_key(&node.id) {
            debug!("add_node: {} already exists", node.id);
            return false;
        }
        if node.created_at == 0 {
            let stamp = self.clock.now();
            node.created_at = stamp;
            node.updated_at = stamp;
        } else {
            self.clock.observe(node.updated_at.max(node.created_at));
        }
        self.normalize(&mut node);
        node.z_index = self.state.order.len();
        let id = node.id;
        debug!("add_node: {id} ({:?})", node.kind());
        self.state.order.push(id);
        self.state.nodes.insert(id, node);
        self.dirty.insert(id);
        self.finish();
        true
    }

    /// Shallow-merge `patch` into a node and bump its `updatedAt`.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) {
        self.update_nodes([(id, patch)]);
    }

    /// Apply several patches as one batch.
    pub fn update_nodes(&mut self, patches: impl IntoIterator<Item = (NodeId, NodePatch)>) {
        let min = self.config.min_node_size;
        for (id, patch) in patches {
            let stamp = self.clock.now();
            let Some(node) = self.state.nodes.get_mut(&id) else {
                trace!("update_node: unknown {id}");
                continue;
            };
            let moved = patch.apply(node, min);
            node.updated_at = stamp;
            if node.collapsed {
                self.state.selection.remove(&id);
            }
            if moved || patch.content.is_some() {
                self.dirty.insert(id);
            }
        }
        self.finish();
    }

    /// Place each node at its snapshot position plus `delta`.
    ///
    /// Gestures call this on every pointer move with the snapshot taken at
    /// gesture start, so coalesced or missed events never accumulate drift.
    pub fn translate_nodes(&mut self, originals: &HashMap<NodeId, BoardNode>, delta: Vec2) {
        let patches: Vec<_> = originals
            .values()
            .filter(|orig| self.state.nodes.contains_key(&orig.id))
            .map(|orig| (orig.id, translate_patch(orig, delta)))
            .collect();
        self.update_nodes(patches);
    }

    /// Remove nodes from `nodes`, `order` and `selection` at once.
    ///
    /// Children of a deleted group are detached rather than deleted. A group
    /// that loses its last child is deleted with it.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) {
        let mut removed: HashSet<NodeId> = ids.iter().copied().filter(|id| self.state.nodes.contains_key(id)).collect();
        if removed.is_empty() {
            return;
        }
        loop {
            let emptied: HashSet<NodeId> = removed
                .iter()
                .filter_map(|id| self.state.nodes.get(id).and_then(|n| n.parent_id))
                .filter(|parent| !removed.contains(parent))
                .filter(|parent| {
                    self.state
                        .nodes
                        .get(parent)
                        .is_some_and(|g| g.children().iter().all(|c| removed.contains(c)))
                })
                .collect();
            if emptied.is_empty() {
                break;
            }
            trace!("delete_nodes: {} group(s) left empty", emptied.len());
            removed.extend(emptied);
        }
        debug!("delete_nodes: {} node(s)", removed.len());

        let mut detached = Vec::new();
        let mut shrunk_parents = HashSet::new();
        for id in &removed {
            let Some(node) = self.state.nodes.get(id) else {
                continue;
            };
            detached.extend(node.children().iter().copied().filter(|c| !removed.contains(c)));
            if let Some(parent) = node.parent_id.filter(|p| !removed.contains(p)) {
                shrunk_parents.insert(parent);
            }
        }
        for child in detached {
            if let Some(node) = self.state.nodes.get_mut(&child) {
                node.parent_id = None;
            }
            self.touch(child);
        }
        for parent in shrunk_parents {
            if let Some(group) = self.state.nodes.get_mut(&parent).and_then(|n| n.content.as_group_mut()) {
                group.children_ids.retain(|c| !removed.contains(c));
            }
            self.touch(parent);
            // Refit the parent around its remaining children.
            if let Some(&survivor) = self.state.nodes.get(&parent).and_then(|n| n.children().first()) {
                self.dirty.insert(survivor);
            }
        }

        for id in &removed {
            self.state.nodes.remove(id);
        }
        self.state.order.retain(|id| !removed.contains(id));
        self.forget(&removed);
        self.reindex();
        self.finish();
    }

    pub fn delete_selection(&mut self) {
        let ids = self.state.selected_ids();
        if ids.is_empty() {
            return;
        }
        self.push_undo();
        self.delete_nodes(&ids);
    }

    // ----- selection -----

    /// Replace the selection. Unknown and collapsed ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        let nodes = &self.state.nodes;
        let selection: HashSet<NodeId> = ids
            .into_iter()
            .filter(|id| nodes.get(id).is_some_and(|n| !n.collapsed))
            .collect();
        self.state.selection = selection;
        self.finish();
    }

    pub fn toggle_selection(&mut self, id: NodeId) {
        if !self.state.nodes.get(&id).is_some_and(|n| !n.collapsed) {
            return;
        }
        if !self.state.selection.remove(&id) {
            self.state.selection.insert(id);
        }
        self.finish();
    }

    pub fn clear_selection(&mut self) {
        if self.state.selection.is_empty() {
            return;
        }
        self.state.selection.clear();
        self.finish();
    }

    /// Select every visible top-level node.
    pub fn select_all(&mut self) {
        let ids: Vec<NodeId> = self
            .state
            .visible_nodes()
            .filter(|n| n.parent_id.is_none())
            .map(|n| n.id)
            .collect();
        self.set_selection(ids);
    }

    // ----- flags -----

    pub fn set_locked(&mut self, ids: &[NodeId], locked: bool) {
        let patch = NodePatch {
            locked: Some(locked),
            ..Default::default()
        };
        self.update_nodes(ids.iter().map(|&id| (id, patch.clone())));
    }

    /// Collapse nodes into the dock (or restore them). Collapsed nodes leave the selection.
    pub fn set_collapsed(&mut self, ids: &[NodeId], collapsed: bool) {
        let patch = NodePatch {
            collapsed: Some(collapsed),
            ..Default::default()
        };
        self.update_nodes(ids.iter().map(|&id| (id, patch.clone())));
    }

    // ----- history -----

    fn capture(&self) -> Snapshot {
        Snapshot {
            nodes: self.state.nodes.clone(),
            order: self.state.order.clone(),
        }
    }

    /// Record the current document as an undo point.
    pub fn push_undo(&mut self) {
        let snapshot = self.capture();
        self.history.push(snapshot);
    }

    pub(crate) fn discard_undo(&mut self) {
        self.history.discard_last();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let current = self.capture();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.capture();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot { mut nodes, order } = snapshot;
        // Restored versions are new writes as far as sync is concerned.
        for (id, node) in nodes.iter_mut() {
            if self.state.nodes.get(id) != Some(&*node) {
                node.updated_at = self.clock.now();
            }
        }
        let removed: HashSet<NodeId> = self.state.nodes.keys().filter(|id| !nodes.contains_key(id)).copied().collect();
        self.state.nodes = nodes;
        self.state.order = order;
        self.forget(&removed);
        let nodes = &self.state.nodes;
        self.state.selection.retain(|id| nodes.get(id).is_some_and(|n| !n.collapsed));
        self.reindex();
        self.finish();
    }

    // ----- remote sync -----

    /// Inject a node record from a sync collaborator.
    ///
    /// The record is ignored when the local copy carries a newer `updatedAt`.
    /// Accepted records are clamped and their group links checked like
    /// local writes.
    pub fn apply_remote(&mut self, mut node: BoardNode) -> bool {
        let local_z = match self.state.nodes.get(&node.id) {
            Some(local) if local.updated_at > node.updated_at => {
                debug!("apply_remote: stale record for {}", node.id);
                return false;
            }
            local => local.map(|n| n.z_index),
        };
        self.link_remote(&mut node);
        match local_z {
            Some(z_index) => {
                node.z_index = z_index;
                self.normalize(&mut node);
                self.clock.observe(node.updated_at);
                let id = node.id;
                if node.collapsed {
                    self.state.selection.remove(&id);
                }
                self.state.nodes.insert(id, node);
                self.dirty.insert(id);
                self.finish();
                true
            }
            None => self.add_node(node),
        }
    }

    /// Remove nodes deleted remotely.
    pub fn remove_remote(&mut self, ids: &[NodeId]) {
        self.delete_nodes(ids);
    }

    // ----- viewport -----

    pub fn set_viewport_size(&mut self, size: Size) {
        self.state.viewport.width = size.width;
        self.state.viewport.height = size.height;
        self.finish();
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.state.viewport.pan(delta);
        self.finish();
    }

    /// Zoom about a screen point, clamped to the configured range.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        self.state.viewport.zoom_at(screen_point, factor, min, max);
        self.finish();
    }

    /// Fit every visible node into the viewport.
    pub fn zoom_to_fit(&mut self, padding: f64) {
        let Some(bounds) = self.state.bounds() else {
            return;
        };
        let (min, max) = (self.config.min_zoom, self.config.max_zoom);
        self.state.viewport.fit_to_bounds(bounds, padding, min, max);
        self.finish();
    }

    // ----- presentation -----

    /// Enter focus mode on a node, or leave it with `None`.
    pub fn set_focus(&mut self, target: Option<NodeId>) {
        let target = target.filter(|id| self.state.nodes.contains_key(id));
        self.state.interaction.focus = target;
        self.finish();
    }

    /// Mutate the ephemeral interaction fields.
    pub fn update_interaction(&mut self, f: impl FnOnce(&mut InteractionState)) {
        f(&mut self.state.interaction);
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{GroupContent, NodeContent, ShapeKind, Structure};
    use kurbo::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn rect_node(x: f64, y: f64, w: f64, h: f64) -> BoardNode {
        BoardNode::shape(ShapeKind::Rectangle, Rect::new(x, y, x + w, y + h))
    }

    #[test]
    fn test_add_assigns_z_index_and_timestamps() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let b = rect_node(10.0, 10.0, 100.0, 100.0);
        let (a_id, b_id) = (a.id, b.id);
        assert!(store.add_node(a));
        assert!(store.add_node(b));
        let state = store.state();
        assert_eq!(state.order, vec![a_id, b_id]);
        assert_eq!(state.nodes[&b_id].z_index, 1);
        assert!(state.nodes[&a_id].created_at > 0);
        assert!(state.nodes[&b_id].updated_at > state.nodes[&a_id].updated_at);
        assert!(state.check_invariants());
    }

    #[test]
    fn test_duplicate_add_is_ignored() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        assert!(store.add_node(a.clone()));
        assert!(!store.add_node(a));
        assert_eq!(store.state().len(), 1);
    }

    #[test]
    fn test_update_bumps_updated_at() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        let before = store.state().nodes[&id].updated_at;
        store.update_node(id, NodePatch::position(50.0, 60.0));
        let node = &store.state().nodes[&id];
        assert!(node.updated_at > before);
        assert!((node.x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = Store::new();
        store.update_node(uuid::Uuid::new_v4(), NodePatch::position(1.0, 1.0));
        assert!(store.state().is_empty());
    }

    #[test]
    fn test_resize_below_minimum_clamps() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        store.update_node(id, NodePatch::size(3.0, 0.0));
        let node = &store.state().nodes[&id];
        assert!((node.w - 20.0).abs() < f64::EPSILON);
        assert!((node.h - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_delete_removes_from_order_and_selection() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let b = rect_node(200.0, 0.0, 100.0, 100.0);
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        store.set_selection([a_id, b_id]);
        store.delete_nodes(&[a_id, uuid::Uuid::new_v4()]);
        let state = store.state();
        assert_eq!(state.order, vec![b_id]);
        assert!(!state.selection.contains(&a_id));
        assert!(state.check_invariants());
    }

    #[test]
    fn test_selection_drops_unknown_ids() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        let ghost = uuid::Uuid::new_v4();
        store.set_selection([id, ghost]);
        assert_eq!(store.state().selection, HashSet::from([id]));
        store.set_selection([id, ghost]);
        assert_eq!(store.state().selection, HashSet::from([id]));
        store.toggle_selection(ghost);
        store.toggle_selection(id);
        assert!(store.state().selection.is_empty());
    }

    #[test]
    fn test_collapse_removes_from_selection() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        store.set_selection([id]);
        store.set_collapsed(&[id], true);
        assert!(store.state().selection.is_empty());
        store.set_selection([id]);
        assert!(store.state().selection.is_empty());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0usize));
        let counter = calls.clone();
        let sub = store.subscribe(move |_| *counter.borrow_mut() += 1);
        store.add_node(rect_node(0.0, 0.0, 50.0, 50.0));
        assert_eq!(*calls.borrow(), 1);
        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        store.add_node(rect_node(0.0, 0.0, 50.0, 50.0));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_batch_notifies_once() {
        let mut store = Store::new();
        let calls = Rc::new(RefCell::new(0usize));
        let counter = calls.clone();
        store.subscribe(move |state| {
            assert!(state.check_invariants());
            *counter.borrow_mut() += 1;
        });
        store.batch(|s| {
            s.add_node(rect_node(0.0, 0.0, 50.0, 50.0));
            s.add_node(rect_node(100.0, 0.0, 50.0, 50.0));
        });
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_undo_redo_restores_geometry() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        store.push_undo();
        store.update_node(id, NodePatch::position(300.0, 300.0));
        assert!(store.undo());
        assert!((store.state().nodes[&id].x - 0.0).abs() < f64::EPSILON);
        assert!(store.redo());
        assert!((store.state().nodes[&id].x - 300.0).abs() < f64::EPSILON);
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_of_add_clears_selection() {
        let mut store = Store::new();
        store.push_undo();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        store.set_selection([id]);
        assert!(store.undo());
        assert!(store.state().is_empty());
        assert!(store.state().selection.is_empty());
        assert!(store.state().check_invariants());
    }

    #[test]
    fn test_remote_record_last_write_wins() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let id = a.id;
        store.add_node(a);
        let local = store.state().nodes[&id].clone();

        let mut stale = local.clone();
        stale.x = 999.0;
        stale.updated_at = local.updated_at - 1;
        assert!(!store.apply_remote(stale));
        assert!((store.state().nodes[&id].x - 0.0).abs() < f64::EPSILON);

        let mut fresh = local.clone();
        fresh.x = 42.0;
        fresh.updated_at = local.updated_at + 10;
        assert!(store.apply_remote(fresh));
        assert!((store.state().nodes[&id].x - 42.0).abs() < f64::EPSILON);
        // Later local writes still sort after the remote stamp.
        store.update_node(id, NodePatch::position(1.0, 1.0));
        assert!(store.state().nodes[&id].updated_at > local.updated_at + 10);
    }

    #[test]
    fn test_remote_insert_keeps_stamps() {
        let mut store = Store::new();
        let mut remote = rect_node(0.0, 0.0, 100.0, 100.0).with_structure(Structure::default());
        remote.created_at = 5;
        remote.updated_at = 7;
        let id = remote.id;
        assert!(store.apply_remote(remote));
        assert_eq!(store.state().nodes[&id].updated_at, 7);
        assert!(store.state().check_invariants());
    }

    #[test]
    fn test_remote_record_is_clamped_and_linked() {
        let mut store = Store::new();
        let mut tiny = rect_node(0.0, 0.0, 1.0, 1.0);
        tiny.parent_id = Some(uuid::Uuid::new_v4());
        tiny.updated_at = 3;
        let tiny_id = tiny.id;
        assert!(store.apply_remote(tiny));
        let node = &store.state().nodes[&tiny_id];
        assert!((node.w - store.config().min_node_size).abs() < f64::EPSILON);
        assert!((node.h - store.config().min_node_size).abs() < f64::EPSILON);
        assert_eq!(node.parent_id, None);

        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let b = rect_node(200.0, 0.0, 100.0, 100.0);
        let (a_id, b_id) = (a.id, b.id);
        store.add_node(a);
        store.add_node(b);
        store.set_selection([a_id, b_id]);
        let group = store.group_selection().unwrap();

        // An existing node moved into the group by a collaborator.
        let mut joined = store.state().nodes[&tiny_id].clone();
        joined.parent_id = Some(group);
        joined.x = 400.0;
        joined.updated_at += 100;
        assert!(store.apply_remote(joined));
        let group_node = &store.state().nodes[&group];
        assert_eq!(group_node.children(), &[a_id, b_id, tiny_id]);
        assert_eq!(group_node.frame(), Rect::new(0.0, 0.0, 420.0, 100.0));

        // And out of it again.
        let mut left = store.state().nodes[&tiny_id].clone();
        left.parent_id = None;
        left.updated_at += 100;
        assert!(store.apply_remote(left));
        let group_node = &store.state().nodes[&group];
        assert_eq!(group_node.children(), &[a_id, b_id]);
        assert_eq!(group_node.frame(), Rect::new(0.0, 0.0, 300.0, 100.0));
    }

    #[test]
    fn test_remote_group_drops_unknown_children() {
        let mut store = Store::new();
        let a = rect_node(0.0, 0.0, 100.0, 100.0);
        let a_id = a.id;
        store.add_node(a);
        let mut group = BoardNode::new(
            NodeContent::Group(GroupContent {
                children_ids: vec![a_id, uuid::Uuid::new_v4()],
                label: None,
            }),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        group.updated_at = 1;
        let group_id = group.id;
        assert!(store.apply_remote(group));
        assert_eq!(store.state().nodes[&group_id].children(), &[a_id]);
        assert_eq!(store.state().nodes[&a_id].parent_id, Some(group_id));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut store = Store::new();
        store.zoom_at(Point::ZERO, 100.0);
        assert!((store.state().viewport.zoom - 5.0).abs() < f64::EPSILON);
        store.zoom_at(Point::ZERO, 0.0001);
        assert!((store.state().viewport.zoom - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_focus_requires_existing_node() {
        let mut store = Store::new();
        store.set_focus(Some(uuid::Uuid::new_v4()));
        assert_eq!(store.state().interaction.focus, None);
    }
}
