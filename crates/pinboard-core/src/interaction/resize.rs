//! Resize math for single rotated nodes and multi-node scaling.

use super::handles::HandleDir;
use crate::geometry::{map_between, rotate_point};
use crate::node::{BoardNode, NodeContent};
use crate::store::NodePatch;
use kurbo::{Point, Rect, Size, Vec2};

/// Drag the edges named by `dir` by `delta`, keeping the opposite edges fixed.
///
/// With `keep_aspect` (corner handles only) the larger relative change wins on
/// both axes. Sizes never drop below `min`; dragging past the opposite edge
/// clamps rather than flips.
pub fn resize_rect(rect: Rect, dir: HandleDir, delta: Vec2, keep_aspect: bool, min: f64) -> Rect {
    let (sx, sy) = dir.signs();
    let mut w = rect.width() + f64::from(sx) * delta.x;
    let mut h = rect.height() + f64::from(sy) * delta.y;

    if keep_aspect && dir.is_corner() && rect.width() > 0.0 && rect.height() > 0.0 {
        let scale = (w / rect.width())
            .max(h / rect.height())
            .max(min / rect.width())
            .max(min / rect.height());
        w = rect.width() * scale;
        h = rect.height() * scale;
    }
    let w = w.max(min);
    let h = h.max(min);

    let x0 = if sx < 0 { rect.x1 - w } else { rect.x0 };
    let y0 = if sy < 0 { rect.y1 - h } else { rect.y0 };
    Rect::from_origin_size(Point::new(x0, y0), Size::new(w, h))
}

/// Resize a node frame rotated by `rotation` from a world-space drag.
///
/// The delta is projected into the node's local frame and the result is
/// re-centered so the anchored side stays put on screen.
pub fn resize_rotated(frame: Rect, rotation: f64, dir: HandleDir, world_delta: Vec2, keep_aspect: bool, min: f64) -> Rect {
    let local_delta = rotate_point(world_delta.to_point(), Point::ZERO, -rotation).to_vec2();
    let resized = resize_rect(frame, dir, local_delta, keep_aspect, min);
    if rotation == 0.0 {
        return resized;
    }
    let center = rotate_point(resized.center(), frame.center(), rotation);
    Rect::from_center_size(center, resized.size())
}

/// Patch that maps `original` from the box `from` into the box `to`.
///
/// Positions and sizes scale per axis; fonts scale by the larger factor.
/// Lines move their endpoints; groups are skipped and refit by the store.
pub fn scale_patch(original: &BoardNode, from: Rect, to: Rect) -> NodePatch {
    let sx = if from.width() > 0.0 { to.width() / from.width() } else { 1.0 };
    let sy = if from.height() > 0.0 { to.height() / from.height() } else { 1.0 };
    match &original.content {
        NodeContent::Group(_) => NodePatch::default(),
        NodeContent::Line(line) => {
            let mut line = line.clone();
            line.start = map_between(line.start, from, to);
            line.end = map_between(line.end, from, to);
            NodePatch::content(NodeContent::Line(line))
        }
        content => {
            let center = map_between(original.center(), from, to);
            let size = Size::new(original.w * sx, original.h * sy);
            let mut patch = NodePatch::frame(Rect::from_center_size(center, size));
            if let Some(font) = content.font_size() {
                let mut content = content.clone();
                content.set_font_size(font * sx.max(sy));
                patch.content = Some(content);
            }
            patch
        }
    }
}
