//! Choosing which text field a double-click edits.

use crate::node::{BoardNode, NodeContent, TextField, ZoneContent, CARD_TITLE_FRACTION, HEADER_FRACTION};
use crate::state::{BoardState, EditTarget};
use kurbo::Point;

/// Outcome of a double-click at a world point.
#[derive(Debug, Clone, PartialEq)]
pub enum EditResolution {
    /// Edit an existing field.
    Field(EditTarget),
    /// Create a text node at the point and edit it.
    CreateText(Point),
}

/// Field of `node` under a world point, if the node has one there.
pub fn field_at(node: &BoardNode, world: Point) -> Option<TextField> {
    let unit = node.to_unit(world);
    if let Some(zone) = node.structure.as_ref().and_then(|s| s.zone_at(unit)) {
        if !matches!(zone.content, Some(ZoneContent::Image { .. })) {
            return Some(TextField::Zone(zone.id.clone()));
        }
    }
    match &node.content {
        NodeContent::Card(_) if unit.y < CARD_TITLE_FRACTION => Some(TextField::Title),
        NodeContent::Card(_) => Some(TextField::Body),
        NodeContent::Text(_) => Some(TextField::Text),
        NodeContent::Shape(_) => Some(TextField::Label),
        NodeContent::Composite(c) if unit.y >= HEADER_FRACTION => c.cell_at(unit).map(TextField::Cell).or(Some(TextField::Title)),
        NodeContent::Composite(_) => Some(TextField::Title),
        NodeContent::MenuDesign(m) => m.section_at(unit.y).map(TextField::Section).or(Some(TextField::Title)),
        NodeContent::Board(_) | NodeContent::Group(_) | NodeContent::Image(_) | NodeContent::Line(_) => None,
    }
}

/// Resolve a double-click.
///
/// Groups pass the click to the top-most descendant under the point; boards
/// and empty canvas create a text node. Nodes without text yield `None`.
pub fn resolve_edit(state: &BoardState, world: Point) -> Option<EditResolution> {
    let Some(hit) = state.node_at(world) else {
        return Some(EditResolution::CreateText(world));
    };
    let mut node = state.node(hit)?;
    if node.is_group() {
        let inner = state.node_at_where(world, |n| !n.is_group() && state.is_descendant_of(n.id, hit))?;
        node = state.node(inner)?;
    }
    if matches!(node.content, NodeContent::Board(_)) && node.structure.is_none() {
        return Some(EditResolution::CreateText(world));
    }
    field_at(node, world).map(|field| {
        EditResolution::Field(EditTarget {
            node_id: node.id,
            field,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{CompositeContent, GroupContent, ShapeKind, Structure, Zone};
    use kurbo::Rect;

    fn state_with(nodes: Vec<BoardNode>) -> BoardState {
        let mut state = BoardState::new();
        for (i, mut node) in nodes.into_iter().enumerate() {
            node.z_index = i;
            state.order.push(node.id);
            state.nodes.insert(node.id, node);
        }
        state
    }

    #[test]
    fn test_card_title_and_body() {
        let card = BoardNode::card(Rect::new(0.0, 0.0, 200.0, 100.0), "T");
        assert_eq!(field_at(&card, Point::new(100.0, 10.0)), Some(TextField::Title));
        assert_eq!(field_at(&card, Point::new(100.0, 80.0)), Some(TextField::Body));
    }

    #[test]
    fn test_zone_wins_over_kind() {
        let structure = Structure {
            zones: vec![Zone::new("price", Rect::new(0.5, 0.5, 1.0, 1.0)).with_text("$4")],
        };
        let card = BoardNode::card(Rect::new(0.0, 0.0, 200.0, 100.0), "T").with_structure(structure);
        assert_eq!(field_at(&card, Point::new(180.0, 90.0)), Some(TextField::Zone("price".into())));
        assert_eq!(field_at(&card, Point::new(20.0, 90.0)), Some(TextField::Body));
    }

    #[test]
    fn test_composite_cells() {
        let node = BoardNode::new(NodeContent::Composite(CompositeContent::default()), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(field_at(&node, Point::new(150.0, 90.0)), Some(TextField::Cell(3)));
        assert_eq!(field_at(&node, Point::new(150.0, 5.0)), Some(TextField::Title));
    }

    #[test]
    fn test_empty_canvas_and_board_create_text() {
        let board = BoardNode::board(Rect::new(0.0, 0.0, 400.0, 400.0), "B");
        let state = state_with(vec![board]);
        let p = Point::new(50.0, 50.0);
        assert_eq!(resolve_edit(&state, p), Some(EditResolution::CreateText(p)));
        let q = Point::new(900.0, 900.0);
        assert_eq!(resolve_edit(&state, q), Some(EditResolution::CreateText(q)));
    }

    #[test]
    fn test_group_descends_to_child() {
        let child = BoardNode::shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let group = BoardNode::new(
            NodeContent::Group(GroupContent {
                children_ids: vec![child.id],
                label: None,
            }),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let child = child.with_parent(group.id);
        let child_id = child.id;
        let state = state_with(vec![child, group]);
        let resolution = resolve_edit(&state, Point::new(50.0, 50.0));
        assert_eq!(
            resolution,
            Some(EditResolution::Field(EditTarget {
                node_id: child_id,
                field: TextField::Label,
            }))
        );
    }

    #[test]
    fn test_image_has_no_field() {
        let image = BoardNode::image(Rect::new(0.0, 0.0, 100.0, 100.0), "a.png");
        let state = state_with(vec![image]);
        assert_eq!(resolve_edit(&state, Point::new(50.0, 50.0)), None);
    }
}
