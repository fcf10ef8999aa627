//! Pointer-driven interaction state machine.
//!
//! [`Interaction`] turns device events into store mutations. It owns the
//! current [`Gesture`], reads the store to decide what a press means, asks
//! the snap solver for corrections while dragging, and writes geometry back
//! through the store so bound lines and groups follow.

mod edit;
mod gesture;
mod handles;
mod resize;
mod tools;

pub use edit::{field_at, resolve_edit, EditResolution};
pub use gesture::{CreateState, DragState, EditState, Gesture, MarqueeState, Originals, ResizeState, RotateState};
pub use handles::{HandleDir, HandleKind, HandleMetrics, SelectionBox};
pub use resize::{resize_rect, resize_rotated, scale_patch};
pub use tools::{build_node, connect_target, draft_frame, ToolKind};

use crate::geometry::union_rects;
use crate::input::{ClickTracker, Key, PointerButton, PointerEvent, PointerId, WheelEvent};
use crate::node::{BoardNode, NodeContent, NodeId, TextField};
use crate::snap::{compute_snap, snap_rotation, snap_targets, threshold_for_zoom};
use crate::state::{ActiveTransform, Draft, EditTarget, TransformKind};
use crate::store::{rotate_patch, translate_patch, NodePatch, Store};
use kurbo::{Point, Rect, Vec2};
use log::{debug, trace};
use std::collections::HashSet;

/// What an Escape press cancelled, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancelled {
    TextEdit,
    ZoneEdit,
    Panel,
    Draft,
    /// A drag, resize, rotation, marquee or pan in progress.
    Gesture,
    Selection,
    Nothing,
}

/// Field opened by Enter on a single selected node.
fn default_field(node: &BoardNode) -> Option<TextField> {
    match node.content {
        NodeContent::Card(_) | NodeContent::Board(_) | NodeContent::Composite(_) | NodeContent::MenuDesign(_) => {
            Some(TextField::Title)
        }
        NodeContent::Text(_) => Some(TextField::Text),
        NodeContent::Shape(_) => Some(TextField::Label),
        NodeContent::Group(_) | NodeContent::Image(_) | NodeContent::Line(_) => None,
    }
}

/// Pointer-driven editor state machine.
#[derive(Debug, Default)]
pub struct Interaction {
    tool: ToolKind,
    gesture: Gesture,
    clicks: ClickTracker,
    space_held: bool,
    panel_open: bool,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    /// Switch tools, dropping any creation draft in progress.
    pub fn set_tool(&mut self, store: &mut Store, tool: ToolKind) {
        if matches!(self.gesture, Gesture::Creating(_)) {
            self.gesture = Gesture::Idle;
            store.update_interaction(|i| i.draft = None);
        }
        self.tool = tool;
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    /// Tell the machine whether a host panel is open, so Escape can close it.
    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    fn set_gesture(&mut self, gesture: Gesture) {
        if self.gesture.name() != gesture.name() {
            debug!("gesture: {} -> {}", self.gesture.name(), gesture.name());
        }
        self.gesture = gesture;
    }

    /// Finish whatever gesture is active, keeping its effects.
    fn end_gesture(&mut self, store: &mut Store) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => return,
            Gesture::EditingText(edit) => self.finish_edit(store, edit),
            _ => {}
        }
        debug!("gesture ended by a new press");
        store.update_interaction(|i| {
            i.marquee = None;
            i.draft = None;
            i.active = None;
            i.guides.clear();
        });
    }

    // ----- pointer -----

    pub fn pointer_down(&mut self, store: &mut Store, ev: PointerEvent) {
        self.end_gesture(store);
        let config = store.config().clone();
        let viewport = store.state().viewport;
        let world = viewport.screen_to_world(ev.position);

        if ev.button == PointerButton::Secondary {
            return;
        }
        if ev.button == PointerButton::Middle || self.space_held || self.tool == ToolKind::Hand {
            self.set_gesture(Gesture::Panning {
                pointer: ev.pointer_id,
                last: ev.position,
            });
            return;
        }

        let selecting = self.tool == ToolKind::Select;

        // 1. Handles of the current selection.
        if selecting {
            if let Some(sbox) = SelectionBox::from_state(store.state()) {
                let metrics = sbox.metrics(config.handle_size_px, config.rotate_handle_offset_px, viewport.zoom);
                if let Some(handle) = sbox.hit_handle(world, metrics) {
                    self.clicks.reset();
                    self.begin_transform(store, ev.pointer_id, world, &sbox, handle);
                    return;
                }
            }
        }

        // 2. Double-click edits.
        let double = self
            .clicks
            .register(ev.time_ms, ev.position, config.double_click_ms, config.double_click_distance);
        if double && selecting {
            match resolve_edit(store.state(), world) {
                Some(EditResolution::Field(target)) => {
                    self.begin_edit(store, target, false);
                    return;
                }
                Some(EditResolution::CreateText(point)) => {
                    self.create_text_at(store, point);
                    return;
                }
                None => {}
            }
        }

        // 3. Nodes, top-most first.
        if selecting {
            if let Some(hit) = store.state().node_at(world) {
                let was_selected = store.state().is_selected(hit);
                if ev.modifiers.shift {
                    store.toggle_selection(hit);
                    if !store.state().is_selected(hit) {
                        return;
                    }
                } else if !was_selected {
                    store.set_selection([hit]);
                }
                let click_target = (was_selected && !ev.modifiers.shift).then_some(hit);
                self.begin_drag(store, ev.pointer_id, world, click_target);
                return;
            }
        }

        // 4. Creation tools.
        if self.tool.creates_nodes() {
            let tool = self.tool;
            store.update_interaction(|i| {
                i.draft = Some(Draft {
                    tool,
                    start: world,
                    current: world,
                })
            });
            self.set_gesture(Gesture::Creating(CreateState {
                pointer: ev.pointer_id,
                tool,
                start: world,
            }));
            return;
        }

        // 5. Background marquee.
        let additive = ev.modifiers.shift;
        if !additive {
            store.clear_selection();
        }
        let base_selection = store.state().selection.clone();
        store.update_interaction(|i| i.marquee = Some(Rect::from_points(world, world)));
        self.set_gesture(Gesture::Marquee(MarqueeState {
            pointer: ev.pointer_id,
            start: world,
            additive,
            base_selection,
        }));
    }

    pub fn pointer_move(&mut self, store: &mut Store, ev: PointerEvent) {
        let world = store.state().viewport.screen_to_world(ev.position);
        match self.gesture.pointer() {
            None => {
                if self.gesture.is_idle() {
                    self.update_hover(store, world);
                }
                return;
            }
            Some(pointer) if pointer != ev.pointer_id => return,
            Some(_) => {}
        }
        if self.is_stale(store) {
            self.abandon(store);
            return;
        }
        trace!("pointer_move {} at {world:?}", self.gesture.name());

        let config = store.config().clone();
        match &mut self.gesture {
            Gesture::Panning { last, .. } => {
                let delta = ev.position - *last;
                *last = ev.position;
                store.pan_by(delta);
            }
            Gesture::Dragging(drag) => {
                let raw = world - drag.start;
                if !drag.moved {
                    if raw.hypot() < config.click_threshold {
                        return;
                    }
                    drag.moved = true;
                    store.push_undo();
                }
                let mut delta = raw;
                let mut guides = Vec::new();
                if !ev.modifiers.command() {
                    let threshold = threshold_for_zoom(config.snap_threshold_px, store.state().viewport.zoom);
                    let snap = compute_snap(drag.bounds + delta, &drag.snap_targets, threshold);
                    delta += Vec2::new(snap.dx, snap.dy);
                    guides = snap.guides;
                }
                let patches: Vec<_> = drag
                    .originals
                    .values()
                    .map(|orig| (orig.id, drag_patch(orig, delta, &drag.moving)))
                    .collect();
                store.batch(|s| {
                    s.update_nodes(patches);
                    s.update_interaction(|i| i.guides = guides);
                });
            }
            Gesture::Resizing(resize) => {
                let delta = world - resize.start;
                if !resize.moved {
                    if delta.hypot() < config.click_threshold {
                        return;
                    }
                    resize.moved = true;
                    store.push_undo();
                }
                let keep_aspect = resize.dir.is_corner() && !ev.modifiers.shift;
                let min = config.min_node_size;
                let patches: Vec<(NodeId, NodePatch)> = match resize.single {
                    Some(id) => {
                        let frame = resize_rotated(resize.frame, resize.rotation, resize.dir, delta, keep_aspect, min);
                        vec![(id, NodePatch::frame(frame))]
                    }
                    None => {
                        let target = resize_rect(resize.frame, resize.dir, delta, keep_aspect, min);
                        resize
                            .originals
                            .values()
                            .map(|orig| (orig.id, scale_patch(orig, resize.frame, target)))
                            .collect()
                    }
                };
                store.update_nodes(patches);
            }
            Gesture::Rotating(rotate) => {
                if !rotate.moved {
                    if (world - rotate.start).hypot() < config.click_threshold {
                        return;
                    }
                    rotate.moved = true;
                    store.push_undo();
                }
                let v = world - rotate.center;
                let raw = rotate.base_rotation + (v.y.atan2(v.x) - rotate.start_angle);
                let snapped = snap_rotation(raw, ev.modifiers.shift, config.rotation_magnet());
                let delta = snapped - rotate.base_rotation;
                let patches: Vec<(NodeId, NodePatch)> = match rotate.single {
                    Some(id) => vec![(id, NodePatch::rotation(snapped))],
                    None => rotate
                        .originals
                        .values()
                        .map(|orig| (orig.id, rotate_patch(orig, rotate.center, delta)))
                        .collect(),
                };
                store.batch(|s| {
                    s.update_nodes(patches);
                    s.update_interaction(|i| {
                        if let Some(active) = i.active.as_mut() {
                            active.angle = Some(snapped);
                        }
                    });
                });
            }
            Gesture::Marquee(marquee) => {
                let rect = Rect::from_points(marquee.start, world);
                store.update_interaction(|i| i.marquee = Some(rect));
            }
            Gesture::Creating(_) => {
                store.update_interaction(|i| {
                    if let Some(draft) = i.draft.as_mut() {
                        draft.current = world;
                    }
                });
            }
            Gesture::Idle | Gesture::EditingText(_) => {}
        }
    }

    pub fn pointer_up(&mut self, store: &mut Store, ev: PointerEvent) {
        match self.gesture.pointer() {
            Some(pointer) if pointer == ev.pointer_id => {}
            _ => return,
        }
        if self.is_stale(store) {
            self.abandon(store);
            return;
        }
        let world = store.state().viewport.screen_to_world(ev.position);
        let click_threshold = store.config().click_threshold;

        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging(drag) => {
                if !drag.moved {
                    if let Some(hit) = drag.click_target {
                        store.set_selection([hit]);
                    }
                }
                self.clear_transform_feedback(store);
            }
            Gesture::Resizing(_) | Gesture::Rotating(_) => self.clear_transform_feedback(store),
            Gesture::Marquee(marquee) => {
                let rect = Rect::from_points(marquee.start, world);
                let is_click = (world - marquee.start).hypot() < click_threshold;
                store.batch(|s| {
                    if !is_click {
                        let hits = s.state().nodes_in_rect(rect);
                        if marquee.additive {
                            let mut selection = marquee.base_selection.clone();
                            for id in hits {
                                if !selection.remove(&id) {
                                    selection.insert(id);
                                }
                            }
                            s.set_selection(selection);
                        } else {
                            s.set_selection(hits);
                        }
                    }
                    s.update_interaction(|i| i.marquee = None);
                });
            }
            Gesture::Creating(create) => {
                let is_click = (world - create.start).hypot() < click_threshold;
                self.finish_create(store, create, world, is_click);
            }
            Gesture::Idle | Gesture::Panning { .. } | Gesture::EditingText(_) => {}
        }
    }

    /// The host released pointer capture: cancel the gesture it drove.
    pub fn pointer_cancel(&mut self, store: &mut Store, pointer_id: PointerId) {
        if self.gesture.pointer() == Some(pointer_id) {
            debug!("pointer {pointer_id} cancelled during {}", self.gesture.name());
            self.cancel_gesture(store);
        }
    }

    pub fn wheel(&mut self, store: &mut Store, ev: WheelEvent) {
        if ev.modifiers.command() {
            if ev.delta.y == 0.0 {
                return;
            }
            let factor = if ev.delta.y > 0.0 { 1.1 } else { 0.9 };
            store.zoom_at(ev.position, factor);
        } else {
            store.pan_by(ev.delta);
        }
    }

    // ----- keyboard -----

    /// Handle a key press. Returns whether the key was consumed.
    pub fn key_down(&mut self, store: &mut Store, key: &Key) -> bool {
        let editing = matches!(self.gesture, Gesture::EditingText(_));
        match key {
            Key::Escape => self.escape(store) != Cancelled::Nothing,
            Key::Space if !editing => {
                self.space_held = true;
                true
            }
            Key::Delete | Key::Backspace if !editing => {
                if store.state().selection.is_empty() {
                    return false;
                }
                store.delete_selection();
                true
            }
            Key::Enter if !editing => {
                let state = store.state();
                let [id] = state.selected_ids()[..] else {
                    return false;
                };
                let Some(field) = state.node(id).and_then(default_field) else {
                    return false;
                };
                self.begin_edit(store, EditTarget { node_id: id, field }, false);
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&mut self, key: &Key) {
        if *key == Key::Space {
            self.space_held = false;
        }
    }

    /// Cancel the highest-priority thing in progress.
    pub fn escape(&mut self, store: &mut Store) -> Cancelled {
        if let Gesture::EditingText(edit) = &self.gesture {
            let structured = edit.target.field.is_structured();
            self.cancel_edit(store);
            return if structured { Cancelled::ZoneEdit } else { Cancelled::TextEdit };
        }
        if self.panel_open {
            self.panel_open = false;
            return Cancelled::Panel;
        }
        if matches!(self.gesture, Gesture::Creating(_)) {
            self.set_gesture(Gesture::Idle);
            store.update_interaction(|i| i.draft = None);
            return Cancelled::Draft;
        }
        if !self.gesture.is_idle() {
            self.cancel_gesture(store);
            return Cancelled::Gesture;
        }
        if !store.state().selection.is_empty() {
            store.clear_selection();
            return Cancelled::Selection;
        }
        Cancelled::Nothing
    }

    // ----- text editing -----

    /// Field being edited, if any.
    pub fn editing(&self) -> Option<&EditTarget> {
        match &self.gesture {
            Gesture::EditingText(edit) => Some(&edit.target),
            _ => None,
        }
    }

    /// Write `text` into the field being edited and leave edit mode.
    pub fn commit_text(&mut self, store: &mut Store, text: &str) -> bool {
        let Gesture::EditingText(edit) = std::mem::take(&mut self.gesture) else {
            return false;
        };
        let Some(node) = store.state().node(edit.target.node_id) else {
            store.update_interaction(|i| i.editing = None);
            return false;
        };
        let mut updated = node.clone();
        if !updated.set_field_text(&edit.target.field, text) {
            debug!("commit_text: {:?} missing on {}", edit.target.field, updated.id);
            store.update_interaction(|i| i.editing = None);
            return false;
        }
        if updated != *node {
            let patch = NodePatch::content(updated.content).with_structure(updated.structure);
            if !edit.created {
                store.push_undo();
            }
            store.update_node(edit.target.node_id, patch);
        }
        self.finish_edit(store, edit);
        true
    }

    /// Leave edit mode without writing.
    pub fn cancel_edit(&mut self, store: &mut Store) {
        if let Gesture::EditingText(edit) = std::mem::take(&mut self.gesture) {
            self.finish_edit(store, edit);
        }
    }

    fn begin_edit(&mut self, store: &mut Store, target: EditTarget, created: bool) {
        debug!("editing {:?} of {}", target.field, target.node_id);
        let id = target.node_id;
        let editing = target.clone();
        store.batch(|s| {
            s.set_selection([id]);
            s.update_interaction(|i| i.editing = Some(editing));
        });
        self.set_gesture(Gesture::EditingText(EditState { target, created }));
    }

    fn finish_edit(&mut self, store: &mut Store, edit: EditState) {
        let id = edit.target.node_id;
        let empty = store
            .state()
            .node(id)
            .and_then(|n| n.field_text(&edit.target.field))
            .is_some_and(|t| t.trim().is_empty());
        store.batch(|s| {
            s.update_interaction(|i| i.editing = None);
            if edit.created && empty {
                debug!("dropping empty text node {id}");
                s.delete_nodes(&[id]);
                s.discard_undo();
            }
        });
        if !self.gesture.is_idle() {
            self.set_gesture(Gesture::Idle);
        }
    }

    fn create_text_at(&mut self, store: &mut Store, point: Point) {
        let Some(node) = build_node(ToolKind::Text, point, point, true) else {
            return;
        };
        let id = node.id;
        store.push_undo();
        store.add_node(node);
        self.begin_edit(
            store,
            EditTarget {
                node_id: id,
                field: TextField::Text,
            },
            true,
        );
    }

    // ----- gesture helpers -----

    fn update_hover(&mut self, store: &mut Store, world: Point) {
        let hovered = store.state().node_at(world);
        if store.state().interaction.hovered != hovered {
            store.update_interaction(|i| i.hovered = hovered);
        }
    }

    fn begin_drag(&mut self, store: &mut Store, pointer: PointerId, world: Point, click_target: Option<NodeId>) {
        let state = store.state();
        let roots = state
            .selection_roots()
            .into_iter()
            .filter(|id| state.node(*id).is_some_and(|n| !n.locked));
        let ids = state.with_descendants(roots);
        if ids.is_empty() {
            return;
        }
        let originals: Originals = ids.iter().filter_map(|id| state.node(*id)).map(|n| (n.id, n.clone())).collect();
        let moving: HashSet<NodeId> = ids.iter().copied().collect();
        let boxes: Vec<Rect> = originals.values().filter(|n| !n.is_line()).map(BoardNode::aabb).collect();
        let bounds = union_rects(boxes.iter().copied())
            .or_else(|| union_rects(originals.values().map(BoardNode::aabb)))
            .unwrap_or_default();
        let targets = snap_targets(state, &moving);
        let active_targets = ids.clone();

        store.update_interaction(|i| {
            i.active = Some(ActiveTransform {
                kind: TransformKind::Drag,
                targets: active_targets,
                angle: None,
            })
        });
        self.set_gesture(Gesture::Dragging(DragState {
            pointer,
            start: world,
            originals,
            moving,
            bounds,
            snap_targets: targets,
            click_target,
            moved: false,
        }));
    }

    fn begin_transform(&mut self, store: &mut Store, pointer: PointerId, world: Point, sbox: &SelectionBox, handle: HandleKind) {
        let state = store.state();
        let ids = state.with_descendants(state.selection_roots());
        let originals: Originals = ids.iter().filter_map(|id| state.node(*id)).map(|n| (n.id, n.clone())).collect();
        // A single group is transformed through its members.
        let single = sbox.single.filter(|id| state.node(*id).is_some_and(|n| !n.is_group()));

        let kind = match handle {
            HandleKind::Resize(_) => TransformKind::Resize,
            HandleKind::Rotate => TransformKind::Rotate,
        };
        let rotation = sbox.rotation;
        store.update_interaction(|i| {
            i.active = Some(ActiveTransform {
                kind,
                targets: ids,
                angle: Some(rotation),
            })
        });

        let gesture = match handle {
            HandleKind::Resize(dir) => Gesture::Resizing(ResizeState {
                pointer,
                dir,
                start: world,
                frame: sbox.rect,
                rotation: sbox.rotation,
                single,
                originals,
                moved: false,
            }),
            HandleKind::Rotate => {
                let center = sbox.center();
                let v = world - center;
                Gesture::Rotating(RotateState {
                    pointer,
                    start: world,
                    center,
                    start_angle: v.y.atan2(v.x),
                    base_rotation: sbox.rotation,
                    single,
                    originals,
                    moved: false,
                })
            }
        };
        self.set_gesture(gesture);
    }

    fn finish_create(&mut self, store: &mut Store, create: CreateState, end: Point, is_click: bool) {
        let Some(mut node) = build_node(create.tool, create.start, end, is_click) else {
            store.update_interaction(|i| i.draft = None);
            return;
        };
        if let Some(line) = node.content.as_line_mut() {
            let state = store.state();
            line.start_binding = connect_target(state, line.start);
            line.end_binding = connect_target(state, line.end);
        }
        let id = node.id;
        debug!("created {:?} {id}", node.kind());
        store.push_undo();
        store.batch(|s| {
            s.add_node(node);
            s.update_interaction(|i| i.draft = None);
            s.set_selection([id]);
        });
        if create.tool == ToolKind::Text {
            self.begin_edit(
                store,
                EditTarget {
                    node_id: id,
                    field: TextField::Text,
                },
                true,
            );
        }
        if create.tool.is_one_shot() {
            self.tool = ToolKind::Select;
        }
    }

    fn clear_transform_feedback(&mut self, store: &mut Store) {
        store.update_interaction(|i| {
            i.active = None;
            i.guides.clear();
        });
    }

    /// Whether any node the gesture captured has disappeared.
    fn is_stale(&self, store: &Store) -> bool {
        self.gesture
            .originals()
            .is_some_and(|originals| originals.keys().any(|id| store.state().node(*id).is_none()))
    }

    /// End a gesture whose targets vanished, without touching the document.
    fn abandon(&mut self, store: &mut Store) {
        debug!("abandoning stale {} gesture", self.gesture.name());
        self.set_gesture(Gesture::Idle);
        self.clear_transform_feedback(store);
    }

    /// Cancel a pointer gesture, restoring transformed nodes.
    fn cancel_gesture(&mut self, store: &mut Store) {
        let gesture = std::mem::take(&mut self.gesture);
        if let Some(originals) = gesture.originals().filter(|_| gesture.has_moved()) {
            let patches: Vec<_> = originals
                .values()
                .filter(|o| store.state().node(o.id).is_some())
                .map(|o| (o.id, NodePatch::restore(o)))
                .collect();
            store.update_nodes(patches);
            store.discard_undo();
        }
        if let Gesture::Marquee(marquee) = &gesture {
            if !marquee.additive {
                store.set_selection(marquee.base_selection.clone());
            }
        }
        store.update_interaction(|i| {
            i.marquee = None;
            i.draft = None;
            i.active = None;
            i.guides.clear();
        });
        debug!("gesture: {} cancelled", gesture.name());
    }
}

/// Translate one dragged node. Lines dragged without a bound target let go of it.
fn drag_patch(original: &BoardNode, delta: Vec2, moving: &HashSet<NodeId>) -> NodePatch {
    let mut patch = translate_patch(original, delta);
    if let Some(NodeContent::Line(line)) = patch.content.as_mut() {
        if line.start_binding.is_some_and(|b| !moving.contains(&b.node_id)) {
            line.start_binding = None;
        }
        if line.end_binding.is_some_and(|b| !moving.contains(&b.node_id)) {
            line.end_binding = None;
        }
    }
    patch
}
