//! Per-gesture state captured at pointer-down.

use super::handles::HandleDir;
use super::tools::ToolKind;
use crate::input::PointerId;
use crate::node::{BoardNode, NodeId};
use crate::state::EditTarget;
use kurbo::{Point, Rect};
use std::collections::{HashMap, HashSet};

/// Nodes as they were when the gesture started.
pub type Originals = HashMap<NodeId, BoardNode>;

#[derive(Debug, Clone)]
pub struct DragState {
    pub pointer: PointerId,
    pub start: Point,
    pub originals: Originals,
    pub moving: HashSet<NodeId>,
    /// Union of the moving frames at gesture start.
    pub bounds: Rect,
    pub snap_targets: Vec<Rect>,
    /// Node to select alone if the gesture ends as a click.
    pub click_target: Option<NodeId>,
    pub moved: bool,
}

#[derive(Debug, Clone)]
pub struct ResizeState {
    pub pointer: PointerId,
    pub dir: HandleDir,
    pub start: Point,
    pub frame: Rect,
    pub rotation: f64,
    /// Resized in its own rotated frame rather than scaled as part of a box.
    pub single: Option<NodeId>,
    pub originals: Originals,
    pub moved: bool,
}

#[derive(Debug, Clone)]
pub struct RotateState {
    pub pointer: PointerId,
    pub start: Point,
    pub center: Point,
    pub start_angle: f64,
    pub base_rotation: f64,
    pub single: Option<NodeId>,
    pub originals: Originals,
    pub moved: bool,
}

#[derive(Debug, Clone)]
pub struct MarqueeState {
    pub pointer: PointerId,
    pub start: Point,
    pub additive: bool,
    pub base_selection: HashSet<NodeId>,
}

#[derive(Debug, Clone)]
pub struct CreateState {
    pub pointer: PointerId,
    pub tool: ToolKind,
    pub start: Point,
}

#[derive(Debug, Clone)]
pub struct EditState {
    pub target: EditTarget,
    /// The node was created for this edit and is dropped if left empty.
    pub created: bool,
}

/// The single gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Panning {
        pointer: PointerId,
        last: Point,
    },
    Dragging(DragState),
    Resizing(ResizeState),
    Rotating(RotateState),
    Marquee(MarqueeState),
    Creating(CreateState),
    EditingText(EditState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Pointer captured by the gesture, if it is pointer-driven.
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Gesture::Idle | Gesture::EditingText(_) => None,
            Gesture::Panning { pointer, .. } => Some(*pointer),
            Gesture::Dragging(s) => Some(s.pointer),
            Gesture::Resizing(s) => Some(s.pointer),
            Gesture::Rotating(s) => Some(s.pointer),
            Gesture::Marquee(s) => Some(s.pointer),
            Gesture::Creating(s) => Some(s.pointer),
        }
    }

    /// Snapshot of the nodes a transform gesture is changing.
    pub fn originals(&self) -> Option<&Originals> {
        match self {
            Gesture::Dragging(s) => Some(&s.originals),
            Gesture::Resizing(s) => Some(&s.originals),
            Gesture::Rotating(s) => Some(&s.originals),
            _ => None,
        }
    }

    /// Whether a transform gesture has already written to the store.
    pub fn has_moved(&self) -> bool {
        match self {
            Gesture::Dragging(s) => s.moved,
            Gesture::Resizing(s) => s.moved,
            Gesture::Rotating(s) => s.moved,
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::Dragging(_) => "dragging",
            Gesture::Resizing(_) => "resizing",
            Gesture::Rotating(_) => "rotating",
            Gesture::Marquee(_) => "marquee",
            Gesture::Creating(_) => "creating",
            Gesture::EditingText(_) => "editing-text",
        }
    }
}
