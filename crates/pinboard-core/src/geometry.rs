//! Small geometry helpers shared by the model, store and interaction code.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Layout axis used by distribution and snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Rotate `point` by `angle` radians around `center`.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Rectangle spanned by two arbitrary corner points.
pub fn normalized_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Union of a sequence of rectangles, `None` when empty.
pub fn union_rects(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// Inclusive overlap test: touching edges count as intersecting.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Inclusive containment test for a point.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `inner` lies completely inside `outer`.
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Normalize an angle to `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let a = angle.rem_euclid(tau);
    // rem_euclid can round up to exactly tau
    if a >= tau { 0.0 } else { a }
}

/// Map `point` from `from` into `to`, scaling each axis independently.
pub fn map_between(point: Point, from: Rect, to: Rect) -> Point {
    let sx = if from.width() > 0.0 { to.width() / from.width() } else { 1.0 };
    let sy = if from.height() > 0.0 { to.height() / from.height() } else { 1.0 };
    Point::new(
        to.x0 + (point.x - from.x0) * sx,
        to.y0 + (point.y - from.y0) * sy,
    )
}

/// Center of `rect` along `axis`.
pub fn center_on(rect: Rect, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => rect.center().x,
        Axis::Vertical => rect.center().y,
    }
}

/// Unit offset along `axis`.
pub fn axis_vec(axis: Axis, amount: f64) -> Vec2 {
    match axis {
        Axis::Horizontal => Vec2::new(amount, 0.0),
        Axis::Vertical => Vec2::new(0.0, amount),
    }
}
