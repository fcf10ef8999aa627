//! Shallow node patches.

use crate::node::{BoardNode, NodeContent, NodeId, Structure};
use kurbo::Rect;

/// Fields to overwrite on a node. `None` leaves a field untouched.
///
/// Content is replaced wholesale; merging inside a payload is the caller's job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub w: Option<f64>,
    pub h: Option<f64>,
    pub rotation: Option<f64>,
    pub content: Option<NodeContent>,
    pub parent_id: Option<Option<NodeId>>,
    pub structure: Option<Option<Structure>>,
    pub locked: Option<bool>,
    pub collapsed: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(w: f64, h: f64) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Default::default()
        }
    }

    pub fn frame(frame: Rect) -> Self {
        Self {
            x: Some(frame.x0),
            y: Some(frame.y0),
            w: Some(frame.width()),
            h: Some(frame.height()),
            ..Default::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Default::default()
        }
    }

    pub fn content(content: NodeContent) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    /// Geometry and content of `node`, used to restore a snapshot.
    pub fn restore(node: &BoardNode) -> Self {
        Self {
            x: Some(node.x),
            y: Some(node.y),
            w: Some(node.w),
            h: Some(node.h),
            rotation: Some(node.rotation),
            content: Some(node.content.clone()),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: NodeContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_structure(mut self, structure: Option<Structure>) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge into `node`, clamping sizes to `min_size`.
    ///
    /// Returns whether the node's frame changed. Line frames are derived from
    /// their endpoints: a position patch translates the endpoints and size
    /// patches are ignored.
    pub(crate) fn apply(&self, node: &mut BoardNode, min_size: f64) -> bool {
        let before = (node.frame(), node.rotation);

        if let Some(content) = &self.content {
            node.content = content.clone();
        }
        if let Some(parent) = self.parent_id {
            node.parent_id = parent;
        }
        if let Some(structure) = &self.structure {
            node.structure = structure.clone();
        }
        if let Some(locked) = self.locked {
            node.locked = locked;
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }

        if node.is_line() {
            node.sync_line_frame();
            let dx = self.x.map_or(0.0, |x| x - node.x);
            let dy = self.y.map_or(0.0, |y| y - node.y);
            if dx != 0.0 || dy != 0.0 {
                node.translate(kurbo::Vec2::new(dx, dy));
            }
        } else {
            if let Some(x) = self.x {
                node.x = x;
            }
            if let Some(y) = self.y {
                node.y = y;
            }
            if let Some(w) = self.w {
                node.w = w.max(min_size);
            }
            if let Some(h) = self.h {
                node.h = h.max(min_size);
            }
            if let Some(rotation) = self.rotation {
                node.rotation = crate::geometry::normalize_angle(rotation);
            }
        }

        before != (node.frame(), node.rotation)
    }
}
