//! Alignment snapping for moving boxes and rotation snapping.

use crate::state::BoardState;
use crate::node::NodeId;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Which line of the moving box produced an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GuideKind {
    EdgeLeft,
    CenterX,
    EdgeRight,
    EdgeTop,
    CenterY,
    EdgeBottom,
}

impl GuideKind {
    const X: [GuideKind; 3] = [GuideKind::EdgeLeft, GuideKind::CenterX, GuideKind::EdgeRight];
    const Y: [GuideKind; 3] = [GuideKind::EdgeTop, GuideKind::CenterY, GuideKind::EdgeBottom];

    /// Guides produced by X alignments are vertical lines.
    pub fn is_vertical(self) -> bool {
        matches!(self, GuideKind::EdgeLeft | GuideKind::CenterX | GuideKind::EdgeRight)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GuideKind::EdgeLeft => "edge-left",
            GuideKind::CenterX => "center-x",
            GuideKind::EdgeRight => "edge-right",
            GuideKind::EdgeTop => "edge-top",
            GuideKind::CenterY => "center-y",
            GuideKind::EdgeBottom => "edge-bottom",
        }
    }
}

/// A transient alignment line in world coordinates.
///
/// Vertical guides sit at `x = position` and run from `y = start` to `y = end`;
/// horizontal guides the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub kind: GuideKind,
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

/// Correction to apply to the moving box, plus feedback guides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapResult {
    pub dx: f64,
    pub dy: f64,
    pub guides: Vec<Guide>,
}

impl SnapResult {
    pub fn is_snapped(&self) -> bool {
        !self.guides.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    delta: f64,
    kind: GuideKind,
    sibling: Rect,
}

fn x_lines(r: Rect) -> [f64; 3] {
    [r.x0, r.center().x, r.x1]
}

fn y_lines(r: Rect) -> [f64; 3] {
    [r.y0, r.center().y, r.y1]
}

fn best_on_axis(
    moving: [f64; 3],
    kinds: [GuideKind; 3],
    siblings: &[Rect],
    lines: fn(Rect) -> [f64; 3],
    threshold: f64,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for &sibling in siblings {
        let targets = lines(sibling);
        for (m, kind) in moving.iter().zip(kinds) {
            for t in targets {
                let delta = t - m;
                if delta.abs() >= threshold {
                    continue;
                }
                if best.is_none_or(|b| delta.abs() < b.delta.abs()) {
                    best = Some(Candidate { delta, kind, sibling });
                }
            }
        }
    }
    best
}

/// Snap `moving` against `siblings`.
///
/// Each axis independently takes the smallest-magnitude delta strictly below
/// `threshold` among the nine line pairings per sibling. The first sibling
/// reaching the minimum wins; which sibling that is on a tie is unspecified.
pub fn compute_snap(moving: Rect, siblings: &[Rect], threshold: f64) -> SnapResult {
    if threshold <= 0.0 || siblings.is_empty() {
        return SnapResult::default();
    }
    let x = best_on_axis(x_lines(moving), GuideKind::X, siblings, x_lines, threshold);
    let y = best_on_axis(y_lines(moving), GuideKind::Y, siblings, y_lines, threshold);

    let dx = x.map_or(0.0, |c| c.delta);
    let dy = y.map_or(0.0, |c| c.delta);
    let snapped = moving + kurbo::Vec2::new(dx, dy);

    let mut guides = Vec::with_capacity(2);
    if let Some(c) = x {
        let index = GuideKind::X.iter().position(|k| *k == c.kind).unwrap_or(0);
        guides.push(Guide {
            kind: c.kind,
            position: x_lines(snapped)[index],
            start: snapped.y0.min(c.sibling.y0),
            end: snapped.y1.max(c.sibling.y1),
        });
    }
    if let Some(c) = y {
        let index = GuideKind::Y.iter().position(|k| *k == c.kind).unwrap_or(0);
        guides.push(Guide {
            kind: c.kind,
            position: y_lines(snapped)[index],
            start: snapped.x0.min(c.sibling.x0),
            end: snapped.x1.max(c.sibling.x1),
        });
    }

    SnapResult { dx, dy, guides }
}

/// Snap threshold in world units for a screen-pixel tolerance.
pub fn threshold_for_zoom(threshold_px: f64, zoom: f64) -> f64 {
    if zoom > 0.0 { threshold_px / zoom } else { threshold_px }
}

/// Frames a moving set can align to: visible, non-line nodes that neither
/// move nor live inside a moving group.
pub fn snap_targets(state: &BoardState, moving: &HashSet<NodeId>) -> Vec<Rect> {
    state
        .visible_nodes()
        .filter(|n| !n.is_line() && !moving.contains(&n.id))
        .filter(|n| !moving.iter().any(|&m| state.is_descendant_of(n.id, m)))
        .map(|n| n.aabb())
        .collect()
}

/// Snap an absolute rotation.
///
/// With `hard` the angle is rounded to the nearest 45°; otherwise it is pulled
/// to the nearest 90° only when within `magnet` radians.
pub fn snap_rotation(angle: f64, hard: bool, magnet: f64) -> f64 {
    if hard {
        return (angle / FRAC_PI_4).round() * FRAC_PI_4;
    }
    let nearest = (angle / FRAC_PI_2).round() * FRAC_PI_2;
    if (angle - nearest).abs() <= magnet { nearest } else { angle }
}
