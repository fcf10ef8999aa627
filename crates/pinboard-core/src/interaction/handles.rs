//! Resize and rotation handles around the current selection.

use crate::geometry::{rect_contains, rotate_point, union_rects};
use crate::node::NodeId;
use crate::state::BoardState;
use kurbo::{Point, Rect, Size};

/// Compass position of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleDir {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl HandleDir {
    pub const ALL: [HandleDir; 8] = [
        HandleDir::N,
        HandleDir::NE,
        HandleDir::E,
        HandleDir::SE,
        HandleDir::S,
        HandleDir::SW,
        HandleDir::W,
        HandleDir::NW,
    ];

    /// Which edges the handle drags: -1 for the left/top edge, 1 for the
    /// right/bottom edge, 0 for neither.
    pub fn signs(self) -> (i8, i8) {
        match self {
            HandleDir::N => (0, -1),
            HandleDir::NE => (1, -1),
            HandleDir::E => (1, 0),
            HandleDir::SE => (1, 1),
            HandleDir::S => (0, 1),
            HandleDir::SW => (-1, 1),
            HandleDir::W => (-1, 0),
            HandleDir::NW => (-1, -1),
        }
    }

    pub fn is_corner(self) -> bool {
        let (sx, sy) = self.signs();
        sx != 0 && sy != 0
    }

    /// Handle position on an unrotated rectangle.
    pub fn anchor(self, rect: Rect) -> Point {
        let (sx, sy) = self.signs();
        let c = rect.center();
        Point::new(
            c.x + f64::from(sx) * rect.width() / 2.0,
            c.y + f64::from(sy) * rect.height() / 2.0,
        )
    }
}

/// A handle on the selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Resize(HandleDir),
    Rotate,
}

/// Handle dimensions in world units for the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    pub size: f64,
    pub rotate_offset: f64,
}

/// The box the selection is transformed through.
///
/// A single node contributes its own rotated frame; multiple nodes an
/// axis-aligned union of their bounding boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionBox {
    pub rect: Rect,
    pub rotation: f64,
    /// Set when exactly one node is selected.
    pub single: Option<NodeId>,
    /// Any selected node is locked.
    pub locked: bool,
    /// The single selected node is a line.
    pub line: bool,
}

impl SelectionBox {
    pub fn from_state(state: &BoardState) -> Option<Self> {
        let nodes: Vec<_> = state.selected_nodes().into_iter().filter(|n| !n.collapsed).collect();
        match nodes.as_slice() {
            [] => None,
            [node] => Some(Self {
                rect: node.frame(),
                rotation: node.rotation,
                single: Some(node.id),
                locked: node.locked,
                line: node.is_line(),
            }),
            many => Some(Self {
                rect: union_rects(many.iter().map(|n| n.aabb()))?,
                rotation: 0.0,
                single: None,
                locked: many.iter().any(|n| n.locked),
                line: false,
            }),
        }
    }

    /// Whether handles are shown and active.
    pub fn transformable(&self) -> bool {
        !self.locked && !self.line
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    /// Fixed screen-size handles, clamped to a third of the shorter side.
    pub fn metrics(&self, handle_size_px: f64, rotate_offset_px: f64, zoom: f64) -> HandleMetrics {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let shorter = self.rect.width().min(self.rect.height());
        HandleMetrics {
            size: (handle_size_px / zoom).min(shorter / 3.0),
            rotate_offset: rotate_offset_px / zoom,
        }
    }

    /// Handle squares in the box's unrotated local frame.
    pub fn local_handles(&self, metrics: HandleMetrics) -> Vec<(HandleKind, Rect)> {
        let size = Size::new(metrics.size, metrics.size);
        let mut handles: Vec<(HandleKind, Rect)> = HandleDir::ALL
            .into_iter()
            .map(|dir| (HandleKind::Resize(dir), Rect::from_center_size(dir.anchor(self.rect), size)))
            .collect();
        handles.push((HandleKind::Rotate, Rect::from_center_size(self.rotate_anchor(metrics), size)));
        handles
    }

    /// Unrotated position of the rotation handle.
    pub fn rotate_anchor(&self, metrics: HandleMetrics) -> Point {
        Point::new(self.rect.center().x, self.rect.y0 - metrics.rotate_offset)
    }

    /// Handle centers in world coordinates.
    pub fn world_handles(&self, metrics: HandleMetrics) -> Vec<(HandleKind, Point)> {
        let center = self.center();
        self.local_handles(metrics)
            .into_iter()
            .map(|(kind, rect)| (kind, rotate_point(rect.center(), center, self.rotation)))
            .collect()
    }

    /// Handle under a world point. The point is brought into the box's
    /// local frame before comparing against the handle squares.
    pub fn hit_handle(&self, world: Point, metrics: HandleMetrics) -> Option<HandleKind> {
        if !self.transformable() {
            return None;
        }
        let local = rotate_point(world, self.center(), -self.rotation);
        let handles = self.local_handles(metrics);
        // Rotation handle first: it never overlaps the box.
        handles
            .iter()
            .rev()
            .find(|(_, rect)| rect_contains(*rect, local))
            .map(|(kind, _)| *kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{BoardNode, ShapeKind};
    use std::f64::consts::FRAC_PI_2;

    fn single(rect: Rect, rotation: f64) -> SelectionBox {
        SelectionBox {
            rect,
            rotation,
            single: None,
            locked: false,
            line: false,
        }
    }

    #[test]
    fn test_handle_size_is_clamped() {
        let b = single(Rect::new(0.0, 0.0, 24.0, 300.0), 0.0);
        let m = b.metrics(10.0, 24.0, 1.0);
        assert!((m.size - 8.0).abs() < 1e-9);
        let m = b.metrics(10.0, 24.0, 4.0);
        assert!((m.size - 2.5).abs() < 1e-9);
        assert!((m.rotate_offset - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_corner_handle() {
        let b = single(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let m = b.metrics(10.0, 24.0, 1.0);
        assert_eq!(b.hit_handle(Point::new(101.0, 99.0), m), Some(HandleKind::Resize(HandleDir::SE)));
        assert_eq!(b.hit_handle(Point::new(50.0, -24.0), m), Some(HandleKind::Rotate));
        assert_eq!(b.hit_handle(Point::new(50.0, 50.0), m), None);
    }

    #[test]
    fn test_hit_on_rotated_box() {
        // Rotated a quarter turn, the top edge faces right.
        let b = single(Rect::new(0.0, 0.0, 100.0, 100.0), FRAC_PI_2);
        let m = b.metrics(10.0, 24.0, 1.0);
        assert_eq!(b.hit_handle(Point::new(100.0, 50.0), m), Some(HandleKind::Resize(HandleDir::N)));
        assert_eq!(b.hit_handle(Point::new(124.0, 50.0), m), Some(HandleKind::Rotate));
    }

    #[test]
    fn test_locked_selection_has_no_handles() {
        let mut b = single(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        b.locked = true;
        let m = b.metrics(10.0, 24.0, 1.0);
        assert_eq!(b.hit_handle(Point::new(100.0, 100.0), m), None);
    }

    #[test]
    fn test_box_from_multi_selection() {
        let mut state = BoardState::new();
        for rect in [Rect::new(0.0, 0.0, 50.0, 50.0), Rect::new(100.0, 100.0, 150.0, 150.0)] {
            let node = BoardNode::shape(ShapeKind::Rectangle, rect);
            state.order.push(node.id);
            state.selection.insert(node.id);
            state.nodes.insert(node.id, node);
        }
        let b = SelectionBox::from_state(&state).unwrap();
        assert_eq!(b.rect, Rect::new(0.0, 0.0, 150.0, 150.0));
        assert!(b.single.is_none());
        assert!(b.transformable());
    }
}
