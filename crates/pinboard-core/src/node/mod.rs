//! Board nodes: positioned, orientable elements of a board.

mod content;
mod structure;

pub use content::{
    BoardContent, CardContent, CompositeCell, CompositeContent, GroupContent, ImageContent,
    LineBinding, LineContent, LineEnd, MenuDesignContent, MenuSection, NodeContent, NodeKind,
    ShapeContent, ShapeKind, Side, TextContent, CARD_TITLE_FRACTION, HEADER_FRACTION,
};
pub use structure::{Structure, Zone, ZoneContent};

use crate::geometry::{rect_contains, rotate_point};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for nodes.
pub type NodeId = Uuid;

/// Smallest width/height a node may be resized to, in world units.
pub const MIN_NODE_SIZE: f64 = 20.0;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Addressable text field of a node, used by inline editing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextField {
    Title,
    Body,
    Text,
    Label,
    Zone(String),
    Cell(usize),
    Section(usize),
}

impl TextField {
    /// Fields that live inside a structured layout rather than on the node itself.
    pub fn is_structured(&self) -> bool {
        matches!(self, TextField::Zone(_) | TextField::Cell(_) | TextField::Section(_))
    }
}

/// A positioned, orientable visual element.
///
/// Serializes to the flat persisted record: geometry, flags and group links
/// at the top level, with `type` and `content` carrying the kind-specific
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NodeRecord", from = "NodeRecord")]
pub struct BoardNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Radians, clockwise on screen, around the frame center.
    pub rotation: f64,
    pub z_index: usize,
    pub content: NodeContent,
    pub parent_id: Option<NodeId>,
    pub structure: Option<Structure>,
    pub locked: bool,
    pub collapsed: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: NodeId,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    z_index: usize,
    #[serde(flatten)]
    content: NodeContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children_ids: Option<Vec<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    structure: Option<Structure>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    collapsed: bool,
    #[serde(default)]
    created_at: u64,
    #[serde(default)]
    updated_at: u64,
}

impl From<BoardNode> for NodeRecord {
    fn from(mut node: BoardNode) -> Self {
        let children_ids = node.content.as_group_mut().map(|g| std::mem::take(&mut g.children_ids));
        Self {
            id: node.id,
            x: node.x,
            y: node.y,
            w: node.w,
            h: node.h,
            rotation: node.rotation,
            z_index: node.z_index,
            content: node.content,
            parent_id: node.parent_id,
            children_ids,
            structure: node.structure,
            locked: node.locked,
            collapsed: node.collapsed,
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

impl From<NodeRecord> for BoardNode {
    fn from(record: NodeRecord) -> Self {
        let mut content = record.content;
        if let (Some(group), Some(children)) = (content.as_group_mut(), record.children_ids) {
            group.children_ids = children;
        }
        Self {
            id: record.id,
            x: record.x,
            y: record.y,
            w: record.w,
            h: record.h,
            rotation: record.rotation,
            z_index: record.z_index,
            content,
            parent_id: record.parent_id,
            structure: record.structure,
            locked: record.locked,
            collapsed: record.collapsed,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl BoardNode {
    /// Create a node with a fresh id. Timestamps are assigned by the store.
    pub fn new(content: NodeContent, frame: Rect) -> Self {
        let mut node = Self {
            id: Uuid::new_v4(),
            x: frame.x0,
            y: frame.y0,
            w: frame.width(),
            h: frame.height(),
            rotation: 0.0,
            z_index: 0,
            content,
            parent_id: None,
            structure: None,
            locked: false,
            collapsed: false,
            created_at: 0,
            updated_at: 0,
        };
        node.sync_line_frame();
        node
    }

    pub fn card(frame: Rect, title: impl Into<String>) -> Self {
        Self::new(
            NodeContent::Card(CardContent {
                title: title.into(),
                ..Default::default()
            }),
            frame,
        )
    }

    pub fn text(frame: Rect, text: impl Into<String>) -> Self {
        Self::new(
            NodeContent::Text(TextContent {
                text: text.into(),
                ..Default::default()
            }),
            frame,
        )
    }

    pub fn shape(kind: ShapeKind, frame: Rect) -> Self {
        Self::new(
            NodeContent::Shape(ShapeContent {
                kind,
                ..Default::default()
            }),
            frame,
        )
    }

    pub fn line(start: Point, end: Point) -> Self {
        Self::new(
            NodeContent::Line(LineContent {
                start,
                end,
                ..Default::default()
            }),
            Rect::ZERO,
        )
    }

    pub fn board(frame: Rect, title: impl Into<String>) -> Self {
        Self::new(
            NodeContent::Board(BoardContent {
                title: title.into(),
                ..Default::default()
            }),
            frame,
        )
    }

    pub fn image(frame: Rect, src: impl Into<String>) -> Self {
        Self::new(
            NodeContent::Image(ImageContent {
                src: src.into(),
                alt: String::new(),
            }),
            frame,
        )
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        if !self.is_line() {
            self.rotation = rotation;
        }
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.content.kind()
    }

    pub fn is_line(&self) -> bool {
        matches!(self.content, NodeContent::Line(_))
    }

    pub fn is_group(&self) -> bool {
        matches!(self.content, NodeContent::Group(_))
    }

    /// Children of a group node; empty for every other kind.
    pub fn children(&self) -> &[NodeId] {
        self.content.as_group().map(|g| g.children_ids.as_slice()).unwrap_or(&[])
    }

    /// Unrotated frame in world coordinates.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.x = frame.x0;
        self.y = frame.y0;
        self.w = frame.width();
        self.h = frame.height();
    }

    /// Local-to-world transform (rotation about the frame center).
    pub fn transform(&self) -> Affine {
        Affine::rotate_about(self.rotation, self.center())
    }

    /// Axis-aligned bounding box of the rotated frame.
    pub fn aabb(&self) -> Rect {
        if self.rotation == 0.0 {
            return self.frame();
        }
        self.transform().transform_rect_bbox(self.frame())
    }

    /// World point expressed in the node's unrotated frame.
    pub fn to_local(&self, world: Point) -> Point {
        rotate_point(world, self.center(), -self.rotation)
    }

    /// World point expressed in unit coordinates of the frame (0..1 inside).
    pub fn to_unit(&self, world: Point) -> Point {
        let local = self.to_local(world);
        let w = if self.w > 0.0 { self.w } else { 1.0 };
        let h = if self.h > 0.0 { self.h } else { 1.0 };
        Point::new((local.x - self.x) / w, (local.y - self.y) / h)
    }

    /// Rotation-aware hit test against `[x, x+w] × [y, y+h]`.
    pub fn contains_point(&self, world: Point) -> bool {
        rect_contains(self.frame(), self.to_local(world))
    }

    /// World position of the midpoint of `side`, following rotation.
    pub fn side_midpoint(&self, side: Side) -> Point {
        rotate_point(side.midpoint(self.frame()), self.center(), self.rotation)
    }

    /// Side whose midpoint is closest to `world`.
    pub fn nearest_side(&self, world: Point) -> Side {
        Side::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = (self.side_midpoint(*a) - world).hypot2();
                let db = (self.side_midpoint(*b) - world).hypot2();
                da.total_cmp(&db)
            })
            .unwrap_or(Side::Top)
    }

    /// Move the node (and line endpoints) by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let Some(line) = self.content.as_line_mut() {
            line.translate(delta);
        }
    }

    /// Recompute a line node's frame from its endpoints. No-op for other kinds.
    pub fn sync_line_frame(&mut self) {
        if let Some(line) = self.content.as_line() {
            let frame = line_frame(line.start, line.end, MIN_NODE_SIZE);
            self.set_frame(frame);
            self.rotation = 0.0;
        }
    }

    /// Current text of an editable field.
    pub fn field_text(&self, field: &TextField) -> Option<String> {
        if let TextField::Zone(id) = field {
            return self
                .structure
                .as_ref()
                .and_then(|s| s.zone(id))
                .map(|z| z.text().unwrap_or_default().to_string());
        }
        match (&self.content, field) {
            (NodeContent::Card(c), TextField::Title) => Some(c.title.clone()),
            (NodeContent::Card(c), TextField::Body) => Some(c.body.clone()),
            (NodeContent::Text(t), TextField::Text) => Some(t.text.clone()),
            (NodeContent::Shape(s), TextField::Label) => Some(s.label.clone()),
            (NodeContent::Composite(c), TextField::Title) => Some(c.title.clone()),
            (NodeContent::Composite(c), TextField::Cell(i)) => c.cells.get(*i).map(|cell| cell.text.clone()),
            (NodeContent::MenuDesign(m), TextField::Title) => Some(m.title.clone()),
            (NodeContent::MenuDesign(m), TextField::Section(i)) => m.sections.get(*i).map(|s| {
                std::iter::once(s.heading.as_str())
                    .chain(s.items.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
            (NodeContent::Board(b), TextField::Title) => Some(b.title.clone()),
            _ => None,
        }
    }

    /// Write an editable field. Returns `false` when the field does not exist on this node.
    pub fn set_field_text(&mut self, field: &TextField, text: &str) -> bool {
        if let TextField::Zone(id) = field {
            let Some(zone) = self.structure.as_mut().and_then(|s| s.zone_mut(id)) else {
                return false;
            };
            zone.content = Some(ZoneContent::Text { text: text.to_string() });
            return true;
        }
        match (&mut self.content, field) {
            (NodeContent::Card(c), TextField::Title) => c.title = text.to_string(),
            (NodeContent::Card(c), TextField::Body) => c.body = text.to_string(),
            (NodeContent::Text(t), TextField::Text) => t.text = text.to_string(),
            (NodeContent::Shape(s), TextField::Label) => s.label = text.to_string(),
            (NodeContent::Composite(c), TextField::Title) => c.title = text.to_string(),
            (NodeContent::Composite(c), TextField::Cell(i)) => match c.cells.get_mut(*i) {
                Some(cell) => cell.text = text.to_string(),
                None => return false,
            },
            (NodeContent::MenuDesign(m), TextField::Title) => m.title = text.to_string(),
            (NodeContent::MenuDesign(m), TextField::Section(i)) => match m.sections.get_mut(*i) {
                Some(section) => {
                    let mut lines = text.lines();
                    section.heading = lines.next().unwrap_or_default().to_string();
                    section.items = lines.map(str::to_string).collect();
                }
                None => return false,
            },
            (NodeContent::Board(b), TextField::Title) => b.title = text.to_string(),
            _ => return false,
        }
        true
    }
}

/// Frame of a line: the endpoints' bounding box grown about its center to at least `min` per side.
pub fn line_frame(start: Point, end: Point, min: f64) -> Rect {
    let bounds = Rect::from_points(start, end);
    let w = bounds.width().max(min);
    let h = bounds.height().max(min);
    Rect::from_center_size(bounds.center(), Size::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn square() -> BoardNode {
        BoardNode::shape(ShapeKind::Rectangle, Rect::new(100.0, 100.0, 150.0, 150.0))
    }

    #[test]
    fn test_hit_unrotated() {
        let node = square();
        assert!(node.contains_point(Point::new(125.0, 125.0)));
        assert!(node.contains_point(Point::new(100.0, 100.0)));
        assert!(!node.contains_point(Point::new(99.0, 125.0)));
    }

    #[test]
    fn test_hit_rotated() {
        let node = BoardNode::shape(ShapeKind::Rectangle, Rect::new(100.0, 100.0, 200.0, 120.0))
            .with_rotation(FRAC_PI_2);
        // The wide bar now stands upright around (150, 110).
        assert!(!node.contains_point(Point::new(105.0, 110.0)));
        assert!(node.contains_point(Point::new(150.0, 70.0)));
        let near_corner = Point::new(101.0, 101.0);
        assert!(!node.contains_point(near_corner));
        let rotated = rotate_point(near_corner, node.center(), FRAC_PI_2);
        assert!(node.contains_point(rotated));
    }

    #[test]
    fn test_aabb_of_rotated_square() {
        let node = square().with_rotation(std::f64::consts::FRAC_PI_4);
        let aabb = node.aabb();
        let half_diag = 25.0 * 2f64.sqrt();
        assert!((aabb.width() - 2.0 * half_diag).abs() < 1e-6);
        assert!((aabb.center().x - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_side_midpoint_follows_rotation() {
        let node = square().with_rotation(FRAC_PI_2);
        // Top side rotates onto the right.
        let p = node.side_midpoint(Side::Top);
        assert!((p.x - 150.0).abs() < EPS);
        assert!((p.y - 125.0).abs() < EPS);
    }

    #[test]
    fn test_nearest_side() {
        let node = square();
        assert_eq!(node.nearest_side(Point::new(200.0, 126.0)), Side::Right);
        assert_eq!(node.nearest_side(Point::new(124.0, 90.0)), Side::Top);
    }

    #[test]
    fn test_line_frame_has_minimum_thickness() {
        let node = BoardNode::line(Point::new(0.0, 50.0), Point::new(200.0, 50.0));
        assert!((node.w - 200.0).abs() < EPS);
        assert!((node.h - MIN_NODE_SIZE).abs() < EPS);
        assert!((node.center().y - 50.0).abs() < EPS);
    }

    #[test]
    fn test_translate_moves_line_endpoints() {
        let mut node = BoardNode::line(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        node.translate(Vec2::new(10.0, 5.0));
        let line = node.content.as_line().unwrap();
        assert_eq!(line.start, Point::new(10.0, 5.0));
        assert_eq!(line.end, Point::new(110.0, 5.0));
    }

    #[test]
    fn test_field_text_round_trip() {
        let mut node = BoardNode::card(Rect::new(0.0, 0.0, 200.0, 100.0), "Soup");
        assert_eq!(node.field_text(&TextField::Title).as_deref(), Some("Soup"));
        assert!(node.set_field_text(&TextField::Body, "Tomato, basil"));
        assert_eq!(node.field_text(&TextField::Body).as_deref(), Some("Tomato, basil"));
        assert!(!node.set_field_text(&TextField::Label, "nope"));
    }

    #[test]
    fn test_zone_field() {
        let structure = Structure {
            zones: vec![Zone::new("price", Rect::new(0.0, 0.0, 1.0, 0.5))],
        };
        let mut node = BoardNode::board(Rect::new(0.0, 0.0, 100.0, 100.0), "Menu").with_structure(structure);
        let field = TextField::Zone("price".into());
        assert!(field.is_structured());
        assert!(node.set_field_text(&field, "$12"));
        assert_eq!(node.field_text(&field).as_deref(), Some("$12"));
        assert!(!node.set_field_text(&TextField::Zone("missing".into()), "x"));
    }

    #[test]
    fn test_record_layout() {
        let node = square();
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "shape");
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("zIndex").is_some());
        assert_eq!(json["content"]["kind"], "rectangle");
        assert!(json.get("childrenIds").is_none());
        let back: BoardNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_group_children_are_a_top_level_field() {
        let child = square();
        let group = BoardNode::new(
            NodeContent::Group(GroupContent {
                children_ids: vec![child.id],
                label: Some("Menu".into()),
            }),
            child.frame(),
        );
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["childrenIds"][0], child.id.to_string());
        assert!(json["content"].get("childrenIds").is_none());
        assert_eq!(json["content"]["label"], "Menu");
        let back: BoardNode = serde_json::from_value(json).unwrap();
        assert_eq!(back.children(), &[child.id]);
        assert_eq!(back, group);
    }
}
