//! Backend-independent frame planning.
//!
//! [`plan_frame`] decides what a frame contains and in which order: culled
//! and level-of-detail node draws, then the selection overlay, marquee,
//! creation draft, guides and the focus layer. Backends only encode the plan.

use crate::renderer::RenderContext;
use kurbo::{Point, Rect};
use log::trace;
use pinboard_core::geometry::{rect_contains_rect, rects_overlap};
use pinboard_core::interaction::{HandleKind, SelectionBox};
use pinboard_core::snap::Guide;
use pinboard_core::{BoardNode, BoardState, Draft, NodeId, TextField};
use std::collections::HashSet;

/// One node to paint.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraw {
    pub id: NodeId,
    /// Paint a flat placeholder instead of the full body.
    pub lod: bool,
    pub selected: bool,
    pub hovered: bool,
    /// Field open in the host's inline editor; its text is not painted.
    pub editing: Option<TextField>,
}

/// Frame and handles around the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOverlay {
    pub rect: Rect,
    pub rotation: f64,
    /// Multi-selections are outlined with a dashed axis-aligned box.
    pub dashed: bool,
    /// Handle centers in world coordinates; empty when locked.
    pub handles: Vec<(HandleKind, Point)>,
    pub handle_size: f64,
    /// Endpoints of a single selected line.
    pub line: Option<(Point, Point)>,
}

/// Presentation focus: everything else is dimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusOverlay {
    pub target: NodeId,
    /// World rectangle the dim layer covers.
    pub dim: Rect,
    /// Repainted above the dim layer, in paint order.
    pub nodes: Vec<NodeDraw>,
}

/// Everything a backend paints for one frame, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub zoom: f64,
    /// Culling rectangle in world coordinates, `None` when the surface size is unknown.
    pub visible: Option<Rect>,
    pub nodes: Vec<NodeDraw>,
    pub selection: Option<SelectionOverlay>,
    pub marquee: Option<Rect>,
    pub draft: Option<Draft>,
    pub guides: Vec<Guide>,
    pub focus: Option<FocusOverlay>,
}

fn node_draw(state: &BoardState, node: &BoardNode, lod: bool) -> NodeDraw {
    let editing = state
        .interaction
        .editing
        .as_ref()
        .filter(|e| e.node_id == node.id)
        .map(|e| e.field.clone());
    NodeDraw {
        id: node.id,
        lod,
        selected: state.is_selected(node.id),
        hovered: state.interaction.hovered == Some(node.id),
        editing,
    }
}

fn selection_overlay(state: &BoardState, ctx: &RenderContext) -> Option<SelectionOverlay> {
    let sbox = SelectionBox::from_state(state)?;
    let metrics = sbox.metrics(
        ctx.options.handle_size_px,
        ctx.options.rotate_handle_offset_px,
        state.viewport.zoom,
    );
    let handles = if sbox.transformable() {
        sbox.world_handles(metrics)
    } else {
        Vec::new()
    };
    let line = sbox
        .single
        .and_then(|id| state.node(id))
        .and_then(|n| n.content.as_line())
        .map(|l| (l.start, l.end));
    Some(SelectionOverlay {
        rect: sbox.rect,
        rotation: sbox.rotation,
        dashed: sbox.single.is_none(),
        handles,
        handle_size: metrics.size,
        line,
    })
}

fn focus_overlay(state: &BoardState, target: NodeId, dim: Rect, lod: bool) -> Option<FocusOverlay> {
    let node = state.node(target)?;
    let frame = node.aabb();
    let mut members: HashSet<NodeId> = state.with_descendants([target]).into_iter().collect();
    members.extend(
        state
            .visible_nodes()
            .filter(|n| rect_contains_rect(frame, n.aabb()))
            .map(|n| n.id),
    );
    let nodes = state
        .visible_nodes()
        .filter(|n| members.contains(&n.id))
        .map(|n| node_draw(state, n, lod))
        .collect();
    Some(FocusOverlay { target, dim, nodes })
}

/// Plan one frame from the current board state.
pub fn plan_frame(ctx: &RenderContext) -> FramePlan {
    let state = ctx.state;
    let viewport = state.viewport;
    let zoom = if viewport.zoom > 0.0 { viewport.zoom } else { 1.0 };
    let lod = zoom < ctx.options.lod_zoom_threshold;

    let visible = (viewport.width > 0.0 && viewport.height > 0.0).then(|| {
        let margin = ctx.options.cull_margin_px / zoom;
        viewport.visible_world_rect().inflate(margin, margin)
    });
    let in_view = |node: &BoardNode| visible.is_none_or(|v| rects_overlap(v, node.aabb()));

    let nodes: Vec<NodeDraw> = state
        .visible_nodes()
        .filter(|n| in_view(n))
        .map(|n| node_draw(state, n, lod))
        .collect();
    trace!("plan_frame: {} of {} node(s) in view", nodes.len(), state.len());

    let focus = state.interaction.focus.and_then(|target| {
        let dim = visible.unwrap_or_else(|| state.bounds().unwrap_or_default());
        focus_overlay(state, target, dim, lod)
    });

    FramePlan {
        zoom,
        visible,
        nodes,
        selection: selection_overlay(state, ctx),
        marquee: state.interaction.marquee,
        draft: state.interaction.draft.clone(),
        guides: state.interaction.guides.clone(),
        focus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use pinboard_core::node::ShapeKind;
    use pinboard_core::Store;

    fn add(store: &mut Store, rect: Rect) -> NodeId {
        let node = BoardNode::shape(ShapeKind::Rectangle, rect);
        let id = node.id;
        store.add_node(node);
        id
    }

    #[test]
    fn test_offscreen_nodes_are_culled() {
        let mut store = Store::new();
        store.set_viewport_size(Size::new(800.0, 600.0));
        let near = add(&mut store, Rect::new(10.0, 10.0, 110.0, 110.0));
        let margin = add(&mut store, Rect::new(830.0, 10.0, 900.0, 110.0));
        add(&mut store, Rect::new(2000.0, 2000.0, 2100.0, 2100.0));

        let plan = plan_frame(&RenderContext::new(store.state()));
        let ids: Vec<NodeId> = plan.nodes.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![near, margin]);
    }

    #[test]
    fn test_unknown_surface_size_skips_culling() {
        let mut store = Store::new();
        add(&mut store, Rect::new(5000.0, 5000.0, 5100.0, 5100.0));
        let plan = plan_frame(&RenderContext::new(store.state()));
        assert!(plan.visible.is_none());
        assert_eq!(plan.nodes.len(), 1);
    }

    #[test]
    fn test_collapsed_nodes_are_skipped() {
        let mut store = Store::new();
        let id = add(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_collapsed(&[id], true);
        assert!(plan_frame(&RenderContext::new(store.state())).nodes.is_empty());
    }

    #[test]
    fn test_lod_below_threshold() {
        let mut store = Store::new();
        add(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.zoom_at(Point::ZERO, 0.3);
        let plan = plan_frame(&RenderContext::new(store.state()));
        assert!(plan.nodes[0].lod);

        store.zoom_at(Point::ZERO, 2.0);
        let plan = plan_frame(&RenderContext::new(store.state()));
        assert!(!plan.nodes[0].lod);
    }

    #[test]
    fn test_single_selection_overlay_has_nine_handles() {
        let mut store = Store::new();
        let id = add(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        store.set_selection([id]);
        let overlay = plan_frame(&RenderContext::new(store.state())).selection.unwrap();
        assert!(!overlay.dashed);
        assert_eq!(overlay.handles.len(), 9);
        assert!((overlay.handle_size - 10.0).abs() < 1e-9);

        store.set_locked(&[id], true);
        let overlay = plan_frame(&RenderContext::new(store.state())).selection.unwrap();
        assert!(overlay.handles.is_empty());
    }

    #[test]
    fn test_multi_selection_overlay_is_dashed() {
        let mut store = Store::new();
        let a = add(&mut store, Rect::new(0.0, 0.0, 100.0, 100.0));
        let b = add(&mut store, Rect::new(200.0, 200.0, 300.0, 300.0));
        store.set_selection([a, b]);
        let overlay = plan_frame(&RenderContext::new(store.state())).selection.unwrap();
        assert!(overlay.dashed);
        assert_eq!(overlay.rect, Rect::new(0.0, 0.0, 300.0, 300.0));
    }

    #[test]
    fn test_focus_layer_repaints_contained_nodes() {
        let mut store = Store::new();
        let board = BoardNode::board(Rect::new(0.0, 0.0, 500.0, 500.0), "Board");
        let board_id = board.id;
        store.add_node(board);
        let inside = add(&mut store, Rect::new(50.0, 50.0, 150.0, 150.0));
        add(&mut store, Rect::new(600.0, 0.0, 700.0, 100.0));
        store.set_focus(Some(board_id));

        let plan = plan_frame(&RenderContext::new(store.state()));
        let focus = plan.focus.unwrap();
        let ids: Vec<NodeId> = focus.nodes.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![board_id, inside]);
        assert_eq!(plan.nodes.len(), 3);
    }
}
