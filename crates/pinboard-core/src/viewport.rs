//! Viewport camera: world ↔ screen mapping, pan and zoom.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Practical zoom range of the editor.
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Camera state mapping world to screen as `screen = world * zoom + (x, y)`.
///
/// `width`/`height` are the host surface size in screen pixels; they are
/// needed for culling and fit-to-content but not for the mapping itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pan_offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// World → screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan_offset()) * Affine::scale(self.zoom)
    }

    /// Screen → world transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan_offset())
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a screen-space delta; independent of zoom.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64, min_zoom: f64, max_zoom: f64) {
        let new_zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        self.set_zoom_at(screen_point, new_zoom);
    }

    fn set_zoom_at(&mut self, screen_point: Point, new_zoom: f64) {
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        let new_screen = self.world_to_screen(world_point);
        self.pan(screen_point - new_screen);
    }

    /// World rectangle currently visible on the surface.
    pub fn visible_world_rect(&self) -> Rect {
        let inv = self.inverse_transform();
        Rect::from_points(inv * Point::ZERO, inv * Point::new(self.width, self.height))
    }

    /// Frame `bounds` in the surface with `padding` screen pixels on each side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64, min_zoom: f64, max_zoom: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let avail = Size::new(
            (self.width - padding * 2.0).max(1.0),
            (self.height - padding * 2.0).max(1.0),
        );
        let zoom = (avail.width / bounds.width())
            .min(avail.height / bounds.height())
            .clamp(min_zoom, max_zoom);
        self.zoom = zoom;
        let c = bounds.center();
        self.x = self.width / 2.0 - c.x * zoom;
        self.y = self.height / 2.0 - c.y * zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let v = Viewport::new();
        let p = Point::new(100.0, 200.0);
        assert_eq!(v.screen_to_world(p), p);
    }

    #[test]
    fn test_mapping_with_pan_and_zoom() {
        let v = Viewport {
            x: 50.0,
            y: 100.0,
            zoom: 2.0,
            ..Default::default()
        };
        let world = v.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
        let screen = v.world_to_screen(Point::new(10.0, 10.0));
        assert!((screen.x - 70.0).abs() < f64::EPSILON);
        assert!((screen.y - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_keeps_cursor_point() {
        let mut v = Viewport {
            x: 30.0,
            y: -20.0,
            zoom: 1.5,
            ..Default::default()
        };
        let cursor = Point::new(400.0, 300.0);
        let before = v.screen_to_world(cursor);
        v.zoom_at(cursor, 1.7, MIN_ZOOM, MAX_ZOOM);
        let after = v.screen_to_world(cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut v = Viewport::new();
        v.zoom_at(Point::ZERO, 0.001, MIN_ZOOM, MAX_ZOOM);
        assert!((v.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        v.zoom_at(Point::ZERO, 1000.0, MIN_ZOOM, MAX_ZOOM);
        assert!((v.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_visible_world_rect() {
        let v = Viewport {
            x: -100.0,
            y: 0.0,
            zoom: 2.0,
            width: 800.0,
            height: 600.0,
        };
        let r = v.visible_world_rect();
        assert!((r.x0 - 50.0).abs() < 1e-9);
        assert!((r.x1 - 450.0).abs() < 1e-9);
        assert!((r.y1 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut v = Viewport {
            width: 800.0,
            height: 600.0,
            ..Default::default()
        };
        v.fit_to_bounds(Rect::new(0.0, 0.0, 400.0, 100.0), 0.0, MIN_ZOOM, MAX_ZOOM);
        assert!((v.zoom - 2.0).abs() < 1e-9);
        let center = v.world_to_screen(Point::new(200.0, 50.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }
}
