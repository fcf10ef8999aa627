//! Typed content payloads, one per node kind.

use super::{NodeId, SerializableColor};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Fraction of a composite or menu node reserved for its title band.
pub const HEADER_FRACTION: f64 = 0.2;

/// Fraction of a card that addresses the title when double-clicked.
pub const CARD_TITLE_FRACTION: f64 = 0.3;

/// Node kind tag, as it appears in persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Card,
    Group,
    Image,
    Text,
    Shape,
    Line,
    Board,
    Composite,
    MenuDesign,
}

/// Node classification together with its type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum NodeContent {
    Card(CardContent),
    Group(GroupContent),
    Image(ImageContent),
    Text(TextContent),
    Shape(ShapeContent),
    Line(LineContent),
    Board(BoardContent),
    Composite(CompositeContent),
    MenuDesign(MenuDesignContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardContent {
    pub title: String,
    pub body: String,
    pub color: SerializableColor,
    pub font_size: f64,
}

impl Default for CardContent {
    fn default() -> Self {
        Self {
            title: String::new(),
            body: String::new(),
            color: SerializableColor::new(255, 244, 179, 255),
            font_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupContent {
    /// Persisted as the record's top-level `childrenIds`.
    #[serde(skip)]
    pub children_ids: Vec<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageContent {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub font_size: f64,
    pub color: SerializableColor,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 20.0,
            color: SerializableColor::black(),
        }
    }
}

/// Primitive outline of a `shape` node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Diamond,
    Triangle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeContent {
    pub kind: ShapeKind,
    pub fill: Option<SerializableColor>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub label: String,
}

impl Default for ShapeContent {
    fn default() -> Self {
        Self {
            kind: ShapeKind::Rectangle,
            fill: Some(SerializableColor::new(224, 231, 255, 255)),
            stroke: SerializableColor::new(55, 65, 81, 255),
            stroke_width: 2.0,
            label: String::new(),
        }
    }
}

/// Side of a node frame a line endpoint can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Midpoint of this side on an unrotated rectangle.
    pub fn midpoint(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            Side::Top => Point::new(c.x, rect.y0),
            Side::Bottom => Point::new(c.x, rect.y1),
            Side::Left => Point::new(rect.x0, c.y),
            Side::Right => Point::new(rect.x1, c.y),
        }
    }
}

/// Attachment of a line endpoint to a side of another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineBinding {
    pub node_id: NodeId,
    pub side: Side,
}

/// Which end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnd {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LineContent {
    pub start: Point,
    pub end: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_binding: Option<LineBinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_binding: Option<LineBinding>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    pub arrow_head: bool,
}

impl Default for LineContent {
    fn default() -> Self {
        Self {
            start: Point::ZERO,
            end: Point::ZERO,
            start_binding: None,
            end_binding: None,
            stroke: SerializableColor::new(55, 65, 81, 255),
            stroke_width: 2.0,
            arrow_head: true,
        }
    }
}

impl LineContent {
    pub fn binding(&self, end: LineEnd) -> Option<LineBinding> {
        match end {
            LineEnd::Start => self.start_binding,
            LineEnd::End => self.end_binding,
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (LineEnd, LineBinding)> + '_ {
        [(LineEnd::Start, self.start_binding), (LineEnd::End, self.end_binding)]
            .into_iter()
            .filter_map(|(end, b)| b.map(|b| (end, b)))
    }

    pub fn point(&self, end: LineEnd) -> Point {
        match end {
            LineEnd::Start => self.start,
            LineEnd::End => self.end,
        }
    }

    pub fn set_point(&mut self, end: LineEnd, point: Point) {
        match end {
            LineEnd::Start => self.start = point,
            LineEnd::End => self.end = point,
        }
    }

    pub fn clear_binding(&mut self, end: LineEnd) {
        match end {
            LineEnd::Start => self.start_binding = None,
            LineEnd::End => self.end_binding = None,
        }
    }

    pub fn is_bound_to(&self, id: NodeId) -> bool {
        self.bindings().any(|(_, b)| b.node_id == id)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.start += delta;
        self.end += delta;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardContent {
    pub title: String,
    pub background: SerializableColor,
}

impl Default for BoardContent {
    fn default() -> Self {
        Self {
            title: String::new(),
            background: SerializableColor::new(248, 250, 252, 255),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeCell {
    pub text: String,
}

/// A titled grid of text cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositeContent {
    pub title: String,
    pub columns: usize,
    pub cells: Vec<CompositeCell>,
}

impl Default for CompositeContent {
    fn default() -> Self {
        Self {
            title: String::new(),
            columns: 2,
            cells: vec![CompositeCell::default(); 4],
        }
    }
}

impl CompositeContent {
    pub fn rows(&self) -> usize {
        let columns = self.columns.max(1);
        self.cells.len().div_ceil(columns)
    }

    /// Frame of cell `index` in unit coordinates of the node (0..1 on both axes).
    pub fn cell_frame(&self, index: usize) -> Option<Rect> {
        if index >= self.cells.len() {
            return None;
        }
        let columns = self.columns.max(1);
        let rows = self.rows().max(1);
        let cell_w = 1.0 / columns as f64;
        let cell_h = (1.0 - HEADER_FRACTION) / rows as f64;
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        let x0 = col * cell_w;
        let y0 = HEADER_FRACTION + row * cell_h;
        Some(Rect::new(x0, y0, x0 + cell_w, y0 + cell_h))
    }

    /// Cell under a unit-space point, if any.
    pub fn cell_at(&self, unit: Point) -> Option<usize> {
        (0..self.cells.len()).find(|&i| {
            self.cell_frame(i)
                .is_some_and(|f| unit.x >= f.x0 && unit.x <= f.x1 && unit.y >= f.y0 && unit.y <= f.y1)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSection {
    pub heading: String,
    pub items: Vec<String>,
}

/// Structured menu layout: a title band followed by stacked sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuDesignContent {
    pub title: String,
    pub sections: Vec<MenuSection>,
}

impl MenuDesignContent {
    pub fn section_frame(&self, index: usize) -> Option<Rect> {
        if index >= self.sections.len() {
            return None;
        }
        let h = (1.0 - HEADER_FRACTION) / self.sections.len() as f64;
        let y0 = HEADER_FRACTION + index as f64 * h;
        Some(Rect::new(0.0, y0, 1.0, y0 + h))
    }

    pub fn section_at(&self, unit_y: f64) -> Option<usize> {
        if self.sections.is_empty() || unit_y < HEADER_FRACTION {
            return None;
        }
        let h = (1.0 - HEADER_FRACTION) / self.sections.len() as f64;
        let index = ((unit_y - HEADER_FRACTION) / h).floor() as usize;
        Some(index.min(self.sections.len() - 1))
    }
}

impl NodeContent {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeContent::Card(_) => NodeKind::Card,
            NodeContent::Group(_) => NodeKind::Group,
            NodeContent::Image(_) => NodeKind::Image,
            NodeContent::Text(_) => NodeKind::Text,
            NodeContent::Shape(_) => NodeKind::Shape,
            NodeContent::Line(_) => NodeKind::Line,
            NodeContent::Board(_) => NodeKind::Board,
            NodeContent::Composite(_) => NodeKind::Composite,
            NodeContent::MenuDesign(_) => NodeKind::MenuDesign,
        }
    }

    pub fn font_size(&self) -> Option<f64> {
        match self {
            NodeContent::Text(t) => Some(t.font_size),
            NodeContent::Card(c) => Some(c.font_size),
            _ => None,
        }
    }

    pub fn set_font_size(&mut self, size: f64) {
        match self {
            NodeContent::Text(t) => t.font_size = size,
            NodeContent::Card(c) => c.font_size = size,
            _ => {}
        }
    }

    pub fn as_line(&self) -> Option<&LineContent> {
        match self {
            NodeContent::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_line_mut(&mut self) -> Option<&mut LineContent> {
        match self {
            NodeContent::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupContent> {
        match self {
            NodeContent::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupContent> {
        match self {
            NodeContent::Group(group) => Some(group),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_cell_lookup() {
        let composite = CompositeContent::default();
        assert_eq!(composite.rows(), 2);
        assert_eq!(composite.cell_at(Point::new(0.1, 0.1)), None);
        assert_eq!(composite.cell_at(Point::new(0.25, 0.3)), Some(0));
        assert_eq!(composite.cell_at(Point::new(0.75, 0.3)), Some(1));
        assert_eq!(composite.cell_at(Point::new(0.75, 0.9)), Some(3));
    }

    #[test]
    fn test_menu_section_lookup() {
        let menu = MenuDesignContent {
            title: "Lunch".into(),
            sections: vec![MenuSection::default(), MenuSection::default()],
        };
        assert_eq!(menu.section_at(0.1), None);
        assert_eq!(menu.section_at(0.3), Some(0));
        assert_eq!(menu.section_at(0.99), Some(1));
        assert_eq!(menu.section_at(1.0), Some(1));
    }

    #[test]
    fn test_content_serializes_with_kind_tag() {
        let content = NodeContent::MenuDesign(MenuDesignContent::default());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "menu-design");
        assert!(json["content"].is_object());
    }

    #[test]
    fn test_side_midpoints() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert_eq!(Side::Top.midpoint(rect), Point::new(50.0, 0.0));
        assert_eq!(Side::Right.midpoint(rect), Point::new(100.0, 25.0));
        assert_eq!(Side::Bottom.midpoint(rect), Point::new(50.0, 50.0));
        assert_eq!(Side::Left.midpoint(rect), Point::new(0.0, 25.0));
    }
}
