//! Creation tools and the nodes they produce.

use crate::node::{
    BoardNode, CardContent, LineBinding, NodeContent, ShapeContent, ShapeKind, TextContent,
};
use crate::state::BoardState;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolKind {
    #[default]
    Select,
    Hand,
    Shape(ShapeKind),
    Text,
    Card,
    Board,
    /// Connector between two nodes.
    Line,
}

impl ToolKind {
    /// Whether pressing on the canvas with this tool starts a creation draft.
    pub fn creates_nodes(self) -> bool {
        !matches!(self, ToolKind::Select | ToolKind::Hand)
    }

    /// Size used when the tool is clicked rather than dragged.
    pub fn default_size(self) -> Size {
        match self {
            ToolKind::Shape(_) => Size::new(120.0, 120.0),
            ToolKind::Text => Size::new(200.0, 40.0),
            ToolKind::Card => Size::new(240.0, 160.0),
            ToolKind::Board => Size::new(640.0, 420.0),
            ToolKind::Line => Size::new(160.0, 0.0),
            ToolKind::Select | ToolKind::Hand => Size::ZERO,
        }
    }

    /// Tools that drop back to select after creating a node.
    pub fn is_one_shot(self) -> bool {
        matches!(self, ToolKind::Text | ToolKind::Card | ToolKind::Board)
    }
}

/// Frame of a draft: the dragged rectangle, or the default size at `start` for a click.
pub fn draft_frame(tool: ToolKind, start: Point, end: Point, is_click: bool) -> Rect {
    if is_click {
        Rect::from_origin_size(start, tool.default_size())
    } else {
        Rect::from_points(start, end)
    }
}

/// Build the node a finished draft creates, or `None` for non-creating tools.
pub fn build_node(tool: ToolKind, start: Point, end: Point, is_click: bool) -> Option<BoardNode> {
    let frame = draft_frame(tool, start, end, is_click);
    let node = match tool {
        ToolKind::Select | ToolKind::Hand => return None,
        ToolKind::Shape(kind) => BoardNode::new(
            NodeContent::Shape(ShapeContent {
                kind,
                ..Default::default()
            }),
            frame,
        ),
        ToolKind::Text => BoardNode::new(NodeContent::Text(TextContent::default()), frame),
        ToolKind::Card => BoardNode::new(NodeContent::Card(CardContent::default()), frame),
        ToolKind::Board => BoardNode::board(frame, "Board"),
        ToolKind::Line => {
            let end = if is_click {
                start + Vec2::new(tool.default_size().width, 0.0)
            } else {
                end
            };
            BoardNode::line(start, end)
        }
    };
    Some(node)
}

/// Binding for a connector endpoint released over a node: the node's side
/// closest to `point`. Lines and groups cannot be connected to.
pub fn connect_target(state: &BoardState, point: Point) -> Option<LineBinding> {
    let id = state.node_at_where(point, |n| !n.is_line() && !n.is_group())?;
    let node = state.node(id)?;
    Some(LineBinding {
        node_id: id,
        side: node.nearest_side(point),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKind, Side};

    #[test]
    fn test_click_uses_default_size() {
        let node = build_node(ToolKind::Card, Point::new(10.0, 20.0), Point::new(11.0, 21.0), true).unwrap();
        assert_eq!(node.kind(), NodeKind::Card);
        assert_eq!(node.frame(), Rect::new(10.0, 20.0, 250.0, 180.0));
    }

    #[test]
    fn test_drag_uses_normalized_rect() {
        let node = build_node(
            ToolKind::Shape(ShapeKind::Ellipse),
            Point::new(200.0, 200.0),
            Point::new(100.0, 150.0),
            false,
        )
        .unwrap();
        assert_eq!(node.frame(), Rect::new(100.0, 150.0, 200.0, 200.0));
    }

    #[test]
    fn test_select_tool_builds_nothing() {
        assert!(build_node(ToolKind::Select, Point::ZERO, Point::ZERO, true).is_none());
        assert!(!ToolKind::Hand.creates_nodes());
    }

    #[test]
    fn test_connect_target_picks_nearest_side() {
        let mut state = BoardState::new();
        let node = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let id = node.id;
        state.order.push(id);
        state.nodes.insert(id, node);
        let binding = connect_target(&state, Point::new(95.0, 40.0)).unwrap();
        assert_eq!(binding.node_id, id);
        assert_eq!(binding.side, Side::Right);
        assert!(connect_target(&state, Point::new(300.0, 300.0)).is_none());
    }
}
