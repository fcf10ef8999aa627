//! Vello-based renderer implementation.

use crate::animation::NodeAnimation;
use crate::plan::{plan_frame, FramePlan, NodeDraw, SelectionOverlay};
use crate::renderer::{RenderContext, Renderer};
use kurbo::{Affine, BezPath, Circle, Ellipse, Line, Point, Rect, RoundedRect, Shape as KurboShape, Stroke, Vec2};
use log::trace;
use parley::layout::PositionedLayoutItem;
use parley::{FontContext, LayoutContext, StyleProperty};
use peniko::{Brush, Color, Fill};
use pinboard_core::interaction::{draft_frame, HandleKind, ToolKind};
use pinboard_core::node::{
    BoardContent, CardContent, CompositeContent, LineContent, MenuDesignContent, ShapeContent, ShapeKind,
    Structure, ZoneContent, HEADER_FRACTION,
};
use pinboard_core::{BoardNode, BoardState, NodeContent, TextField};
use vello::Scene;

/// Fallback family list for board text.
const FONT_STACK: &str = "system-ui, sans-serif";

/// Corner radius of cards and boards, in world units.
const CORNER_RADIUS: f64 = 8.0;

/// Inner padding of text inside node bodies, in world units.
const PADDING: f64 = 10.0;

const BORDER: Color = Color::from_rgba8(203, 213, 225, 255);
const INK: Color = Color::from_rgba8(30, 41, 59, 255);
const MUTED_INK: Color = Color::from_rgba8(100, 116, 139, 255);
const SHADOW: Color = Color::from_rgba8(15, 23, 42, 70);

/// Paragraph style for [`VelloRenderer::render_text`].
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f64,
    color: Color,
    bold: bool,
}

impl TextStyle {
    fn new(size: f64, color: Color) -> Self {
        Self { size, color, bold: false }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Selection highlight color.
    selection_color: Color,
    guide_color: Color,
    /// Font context for text rendering (cached to avoid re-registering fonts).
    font_cx: FontContext,
    /// Layout context for text rendering.
    layout_cx: LayoutContext<Brush>,
    /// Current zoom level (for zoom-independent UI elements).
    zoom: f64,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            selection_color: Color::from_rgba8(59, 130, 246, 255),
            guide_color: Color::from_rgba8(236, 72, 153, 220),
            font_cx: FontContext::new(),
            layout_cx: LayoutContext::new(),
            zoom: 1.0,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Get mutable references to both font and layout contexts, e.g. for a
    /// host-side inline text editor.
    pub fn contexts_mut(&mut self) -> (&mut FontContext, &mut LayoutContext<Brush>) {
        (&mut self.font_cx, &mut self.layout_cx)
    }

    /// Encode an already computed plan.
    pub fn encode_plan(&mut self, plan: &FramePlan, ctx: &RenderContext) {
        self.scene.reset();
        self.selection_color = ctx.options.selection_color;
        self.guide_color = ctx.options.guide_color;
        self.zoom = plan.zoom;

        let state = ctx.state;
        let camera = Affine::scale(ctx.options.scale_factor) * state.viewport.transform();

        for draw in &plan.nodes {
            self.render_node_draw(state, draw, ctx, camera);
        }

        if let Some(selection) = &plan.selection {
            self.render_selection(selection, camera);
        }
        if let Some(rect) = plan.marquee {
            self.render_selection_rect(rect, camera);
        }
        if let Some(draft) = &plan.draft {
            self.render_draft(draft.tool, draft.start, draft.current, camera);
        }
        for guide in &plan.guides {
            self.render_guide(guide, camera);
        }
        let angle = state.interaction.active.as_ref().and_then(|a| a.angle);
        if let (Some(angle), Some(selection)) = (angle, &plan.selection) {
            self.render_rotation_hint(selection, angle, camera);
        }

        if let Some(focus) = &plan.focus {
            self.scene.fill(Fill::NonZero, camera, ctx.options.dim_color, None, &focus.dim);
            for draw in &focus.nodes {
                self.render_node_draw(state, draw, ctx, camera);
            }
        }
        trace!("encoded {} node(s)", plan.nodes.len());
    }

    fn render_node_draw(&mut self, state: &BoardState, draw: &NodeDraw, ctx: &RenderContext, camera: Affine) {
        let Some(node) = state.node(draw.id) else {
            return;
        };
        let anim = ctx.animation.map(|a| a.get(draw.id)).unwrap_or(NodeAnimation {
            lift: 0.0,
            hover: if draw.hovered { 1.0 } else { 0.0 },
            selection: if draw.selected { 1.0 } else { 0.0 },
        });
        if draw.lod {
            self.render_placeholder(node, camera);
        } else {
            self.render_node(node, camera, anim, draw.editing.as_ref());
        }
    }

    /// Flat fill standing in for a node at low zoom.
    fn render_placeholder(&mut self, node: &BoardNode, camera: Affine) {
        let color = match &node.content {
            NodeContent::Card(card) => card.color.into(),
            NodeContent::Shape(shape) => shape.fill.map(Color::from).unwrap_or(Color::from(shape.stroke)),
            NodeContent::Board(board) => board.background.into(),
            NodeContent::Line(line) => {
                let stroke = Stroke::new(line.stroke_width.max(1.0 / self.zoom));
                self.scene
                    .stroke(&stroke, camera, Color::from(line.stroke), None, &Line::new(line.start, line.end));
                return;
            }
            NodeContent::Group(_) => return,
            NodeContent::Text(_) | NodeContent::Image(_) | NodeContent::Composite(_) | NodeContent::MenuDesign(_) => {
                BORDER
            }
        };
        self.scene
            .fill(Fill::NonZero, camera * node.transform(), color, None, &node.frame());
    }

    /// Render one node body with its hover and selection feedback.
    fn render_node(&mut self, node: &BoardNode, camera: Affine, anim: NodeAnimation, editing: Option<&TextField>) {
        let transform = camera * node.transform();
        let frame = node.frame();

        if anim.lift > 0.0 && !node.is_line() && !node.is_group() {
            let offset = Vec2::new(0.0, 6.0 * anim.lift);
            self.scene.draw_blurred_rounded_rect(
                transform * Affine::translate(offset),
                frame,
                SHADOW.with_alpha(0.3 + 0.4 * anim.lift as f32),
                CORNER_RADIUS,
                4.0 + 8.0 * anim.lift,
            );
        }

        match &node.content {
            NodeContent::Card(card) => self.render_card(card, frame, transform, editing),
            NodeContent::Text(text) => {
                if editing.is_none() {
                    let style = TextStyle::new(text.font_size, text.color.into());
                    self.render_text(&text.text, style, frame.origin(), Some(frame.width()), transform);
                }
            }
            NodeContent::Shape(shape) => self.render_shape(shape, frame, transform, editing),
            NodeContent::Line(line) => self.render_line(line, camera),
            NodeContent::Board(board) => self.render_board(board, frame, transform),
            NodeContent::Image(image) => {
                self.render_image_placeholder(frame, transform);
                if !image.alt.is_empty() {
                    let origin = Point::new(frame.x0 + PADDING, frame.y1 - PADDING - 14.0);
                    let style = TextStyle::new(12.0, MUTED_INK);
                    self.render_text(&image.alt, style, origin, Some(frame.width() - 2.0 * PADDING), transform);
                }
            }
            NodeContent::Composite(composite) => self.render_composite(composite, frame, transform, editing),
            NodeContent::MenuDesign(menu) => self.render_menu(menu, frame, transform, editing),
            NodeContent::Group(group) => {
                if let Some(label) = &group.label {
                    let origin = Point::new(frame.x0, frame.y0 - 18.0);
                    self.render_text(label, TextStyle::new(12.0, MUTED_INK), origin, None, transform);
                }
            }
        }

        if let Some(structure) = &node.structure {
            self.render_zones(structure, frame, transform, editing);
        }

        let emphasis = anim.hover.max(anim.selection);
        if emphasis > 0.0 && !node.is_line() {
            let alpha = (0.35 * anim.hover + 0.65 * anim.selection).min(1.0) as f32;
            let mut stroke = Stroke::new(1.5 / self.zoom);
            if node.is_group() {
                let dash = 4.0 / self.zoom;
                stroke = stroke.with_dashes(0.0, [dash, dash]);
            }
            let outline = frame.inflate(2.0 / self.zoom, 2.0 / self.zoom);
            self.scene
                .stroke(&stroke, transform, self.selection_color.with_alpha(alpha), None, &outline);
        }
    }

    fn render_card(&mut self, card: &CardContent, frame: Rect, transform: Affine, editing: Option<&TextField>) {
        let body = RoundedRect::from_rect(frame, CORNER_RADIUS);
        self.scene.fill(Fill::NonZero, transform, Color::from(card.color), None, &body);
        self.scene.stroke(&Stroke::new(1.0), transform, BORDER, None, &body);

        let width = frame.width() - 2.0 * PADDING;
        let title_origin = Point::new(frame.x0 + PADDING, frame.y0 + PADDING);
        if editing != Some(&TextField::Title) {
            let style = TextStyle::new(card.font_size * 1.15, INK).bold();
            self.render_text(&card.title, style, title_origin, Some(width), transform);
        }
        if editing != Some(&TextField::Body) {
            let origin = Point::new(frame.x0 + PADDING, frame.y0 + PADDING + card.font_size * 1.8);
            let style = TextStyle::new(card.font_size, INK);
            self.render_text(&card.body, style, origin, Some(width), transform);
        }
    }

    fn render_shape(&mut self, shape: &ShapeContent, frame: Rect, transform: Affine, editing: Option<&TextField>) {
        let path = shape_path(shape.kind, frame);
        if let Some(fill) = shape.fill {
            self.scene.fill(Fill::NonZero, transform, Color::from(fill), None, &path);
        }
        if shape.stroke_width > 0.0 {
            let stroke = Stroke::new(shape.stroke_width);
            self.scene.stroke(&stroke, transform, Color::from(shape.stroke), None, &path);
        }
        if !shape.label.is_empty() && editing != Some(&TextField::Label) {
            let origin = Point::new(frame.x0 + PADDING, frame.center().y - 10.0);
            let style = TextStyle::new(16.0, INK);
            self.render_text(&shape.label, style, origin, Some(frame.width() - 2.0 * PADDING), transform);
        }
    }

    /// Render a connector in world coordinates, with an optional arrow head at the end.
    fn render_line(&mut self, line: &LineContent, camera: Affine) {
        let color = Color::from(line.stroke);
        let stroke = Stroke::new(line.stroke_width);
        self.scene.stroke(&stroke, camera, color, None, &Line::new(line.start, line.end));

        let dir = line.end - line.start;
        let len = dir.hypot();
        if !line.arrow_head || len < f64::EPSILON {
            return;
        }
        let unit = dir / len;
        let head = (line.stroke_width * 5.0).clamp(8.0, len / 2.0);
        let normal = Vec2::new(-unit.y, unit.x);
        let base = line.end - unit * head;
        let mut path = BezPath::new();
        path.move_to(line.end);
        path.line_to(base + normal * head * 0.5);
        path.line_to(base - normal * head * 0.5);
        path.close_path();
        self.scene.fill(Fill::NonZero, camera, color, None, &path);
    }

    fn render_board(&mut self, board: &BoardContent, frame: Rect, transform: Affine) {
        let body = RoundedRect::from_rect(frame, CORNER_RADIUS);
        self.scene.fill(Fill::NonZero, transform, Color::from(board.background), None, &body);
        self.scene.stroke(&Stroke::new(1.0), transform, BORDER, None, &body);
        if !board.title.is_empty() {
            let origin = Point::new(frame.x0, frame.y0 - 22.0);
            self.render_text(&board.title, TextStyle::new(14.0, MUTED_INK).bold(), origin, None, transform);
        }
    }

    fn render_composite(
        &mut self,
        composite: &CompositeContent,
        frame: Rect,
        transform: Affine,
        editing: Option<&TextField>,
    ) {
        let header = header_band(frame);
        self.scene.fill(Fill::NonZero, transform, Color::WHITE, None, &frame);
        self.scene
            .fill(Fill::NonZero, transform, Color::from_rgba8(241, 245, 249, 255), None, &header);
        if editing != Some(&TextField::Title) {
            let origin = Point::new(header.x0 + PADDING, header.y0 + PADDING);
            let style = TextStyle::new(16.0, INK).bold();
            self.render_text(&composite.title, style, origin, Some(header.width() - 2.0 * PADDING), transform);
        }

        let grid = Stroke::new(1.0);
        for (i, cell) in composite.cells.iter().enumerate() {
            let Some(unit) = composite.cell_frame(i) else {
                continue;
            };
            let rect = unit_to_frame(unit, frame);
            self.scene.stroke(&grid, transform, BORDER, None, &rect);
            if editing != Some(&TextField::Cell(i)) {
                let origin = Point::new(rect.x0 + PADDING / 2.0, rect.y0 + PADDING / 2.0);
                let style = TextStyle::new(14.0, INK);
                self.render_text(&cell.text, style, origin, Some(rect.width() - PADDING), transform);
            }
        }
        self.scene.stroke(&Stroke::new(1.0), transform, BORDER, None, &frame);
    }

    fn render_menu(&mut self, menu: &MenuDesignContent, frame: Rect, transform: Affine, editing: Option<&TextField>) {
        let header = header_band(frame);
        self.scene.fill(Fill::NonZero, transform, Color::WHITE, None, &frame);
        self.scene.stroke(&Stroke::new(1.0), transform, BORDER, None, &frame);
        if editing != Some(&TextField::Title) {
            let origin = Point::new(header.x0 + PADDING, header.y0 + PADDING);
            let style = TextStyle::new(20.0, INK).bold();
            self.render_text(&menu.title, style, origin, Some(header.width() - 2.0 * PADDING), transform);
        }
        for (i, section) in menu.sections.iter().enumerate() {
            let Some(unit) = menu.section_frame(i) else {
                continue;
            };
            if editing == Some(&TextField::Section(i)) {
                continue;
            }
            let rect = unit_to_frame(unit, frame);
            let width = Some(rect.width() - 2.0 * PADDING);
            let origin = Point::new(rect.x0 + PADDING, rect.y0 + PADDING / 2.0);
            self.render_text(&section.heading, TextStyle::new(15.0, INK).bold(), origin, width, transform);
            let items = section.items.join("\n");
            let origin = Point::new(origin.x, origin.y + 22.0);
            self.render_text(&items, TextStyle::new(13.0, MUTED_INK), origin, width, transform);
        }
    }

    fn render_zones(&mut self, structure: &Structure, frame: Rect, transform: Affine, editing: Option<&TextField>) {
        for zone in &structure.zones {
            let rect = unit_to_frame(zone.frame, frame);
            match &zone.content {
                Some(ZoneContent::Text { text }) => {
                    if matches!(editing, Some(TextField::Zone(id)) if *id == zone.id) {
                        continue;
                    }
                    let origin = Point::new(rect.x0 + PADDING / 2.0, rect.y0 + PADDING / 2.0);
                    self.render_text(text, TextStyle::new(14.0, INK), origin, Some(rect.width() - PADDING), transform);
                }
                Some(ZoneContent::Image { .. }) => self.render_image_placeholder(rect, transform),
                None => {}
            }
        }
    }

    /// Image frame with a crossed placeholder; decoding is left to the host.
    fn render_image_placeholder(&mut self, rect: Rect, transform: Affine) {
        self.scene
            .fill(Fill::NonZero, transform, Color::from_rgba8(226, 232, 240, 255), None, &rect);
        let stroke = Stroke::new(2.0);
        self.scene.stroke(&stroke, transform, MUTED_INK, None, &rect);
        let mut cross = BezPath::new();
        cross.move_to(Point::new(rect.x0, rect.y0));
        cross.line_to(Point::new(rect.x1, rect.y1));
        cross.move_to(Point::new(rect.x1, rect.y0));
        cross.line_to(Point::new(rect.x0, rect.y1));
        self.scene.stroke(&Stroke::new(1.0), transform, MUTED_INK, None, &cross);
    }

    /// Lay out and draw a paragraph with its top-left corner at `origin`.
    fn render_text(&mut self, text: &str, style: TextStyle, origin: Point, max_width: Option<f64>, transform: Affine) {
        if text.is_empty() {
            return;
        }
        let brush = Brush::Solid(style.color);
        let weight = if style.bold {
            parley::FontWeight::BOLD
        } else {
            parley::FontWeight::NORMAL
        };

        let mut builder = self.layout_cx.ranged_builder(&mut self.font_cx, text, 1.0, false);
        builder.push_default(StyleProperty::FontSize(style.size as f32));
        builder.push_default(StyleProperty::Brush(brush.clone()));
        builder.push_default(StyleProperty::FontWeight(weight));
        builder.push_default(StyleProperty::FontStack(parley::FontStack::Source(FONT_STACK.into())));
        let mut layout = builder.build(text);

        layout.break_all_lines(max_width.filter(|w| *w > 0.0).map(|w| w as f32));
        layout.align(None, parley::Alignment::Start, parley::AlignmentOptions::default());

        let text_transform = transform * Affine::translate(origin.to_vec2());

        // Adapted from Parley's vello example.
        for line in layout.lines() {
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };
                let mut x = glyph_run.offset();
                let y = glyph_run.baseline();
                let run = glyph_run.run();
                let font = run.font();
                let font_size = run.font_size();
                let synthesis = run.synthesis();
                let glyph_xform = synthesis
                    .skew()
                    .map(|angle| Affine::skew(angle.to_radians().tan() as f64, 0.0));

                let glyphs: Vec<vello::Glyph> = glyph_run
                    .glyphs()
                    .map(|glyph| {
                        let gx = x + glyph.x;
                        let gy = y - glyph.y;
                        x += glyph.advance;
                        vello::Glyph {
                            id: glyph.id,
                            x: gx,
                            y: gy,
                        }
                    })
                    .collect();

                if !glyphs.is_empty() {
                    self.scene
                        .draw_glyphs(font)
                        .brush(&brush)
                        .hint(true)
                        .transform(text_transform)
                        .glyph_transform(glyph_xform)
                        .font_size(font_size)
                        .normalized_coords(run.normalized_coords())
                        .draw(Fill::NonZero, glyphs.into_iter());
                }
            }
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let plan = plan_frame(ctx);
        self.encode_plan(&plan, ctx);
    }
}

impl VelloRenderer {
    /// Render the selection box and its handles.
    /// Stroke widths and handle sizes are scaled inversely with zoom.
    fn render_selection(&mut self, selection: &SelectionOverlay, camera: Affine) {
        let stroke_width = 1.0 / self.zoom;

        if let Some((start, end)) = selection.line {
            let radius = 5.0 / self.zoom;
            for point in [start, end] {
                let circle = Circle::new(point, radius);
                self.scene.fill(Fill::NonZero, camera, Color::WHITE, None, &circle);
                self.scene
                    .stroke(&Stroke::new(2.0 / self.zoom), camera, self.selection_color, None, &circle);
            }
            return;
        }

        let box_transform = camera * Affine::rotate_about(selection.rotation, selection.rect.center());
        let stroke = if selection.dashed {
            let dash_len = 4.0 / self.zoom;
            Stroke::new(stroke_width).with_dashes(0.0, [dash_len, dash_len])
        } else {
            Stroke::new(stroke_width)
        };
        self.scene
            .stroke(&stroke, box_transform, self.selection_color, None, &selection.rect);

        let half = selection.handle_size / 2.0;
        for (kind, center) in &selection.handles {
            match kind {
                HandleKind::Rotate => {
                    // Stem from the top edge to the rotation knob.
                    let top = Affine::rotate_about(selection.rotation, selection.rect.center())
                        * Point::new(selection.rect.center().x, selection.rect.y0);
                    self.scene.stroke(
                        &Stroke::new(stroke_width),
                        camera,
                        self.selection_color,
                        None,
                        &Line::new(top, *center),
                    );
                    let circle = Circle::new(*center, half);
                    self.scene.fill(Fill::NonZero, camera, Color::WHITE, None, &circle);
                    self.scene
                        .stroke(&Stroke::new(1.5 / self.zoom), camera, self.selection_color, None, &circle);
                }
                HandleKind::Resize(_) => {
                    // Squares follow the box rotation.
                    let square = Rect::from_center_size(*center, (selection.handle_size, selection.handle_size));
                    let handle_transform = camera * Affine::rotate_about(selection.rotation, *center);
                    self.scene
                        .fill(Fill::NonZero, handle_transform, Color::WHITE, None, &square);
                    self.scene.stroke(
                        &Stroke::new(1.5 / self.zoom),
                        handle_transform,
                        self.selection_color,
                        None,
                        &square,
                    );
                }
            }
        }
    }

    /// Render a selection rectangle (marquee).
    /// Stroke width and dash pattern are scaled inversely with zoom.
    fn render_selection_rect(&mut self, rect: Rect, transform: Affine) {
        // Fill with semi-transparent blue
        let fill_color = self.selection_color.with_alpha(0.1);
        self.scene.fill(Fill::NonZero, transform, fill_color, None, &rect);

        // Stroke with blue dashed line - scale inversely with zoom
        let stroke_width = 1.0 / self.zoom;
        let dash_len = 4.0 / self.zoom;
        let stroke = Stroke::new(stroke_width).with_dashes(0.0, [dash_len, dash_len]);
        self.scene.stroke(&stroke, transform, self.selection_color, None, &rect);
    }

    /// Dashed outline of the node a creation drag will produce.
    fn render_draft(&mut self, tool: ToolKind, start: Point, current: Point, transform: Affine) {
        let dash_len = 4.0 / self.zoom;
        let stroke = Stroke::new(1.0 / self.zoom).with_dashes(0.0, [dash_len, dash_len]);
        match tool {
            ToolKind::Line => {
                self.scene
                    .stroke(&stroke, transform, self.selection_color, None, &Line::new(start, current));
            }
            ToolKind::Shape(kind) => {
                let path = shape_path(kind, draft_frame(tool, start, current, false));
                self.scene.stroke(&stroke, transform, self.selection_color, None, &path);
            }
            _ => {
                let rect = draft_frame(tool, start, current, false);
                self.scene.stroke(&stroke, transform, self.selection_color, None, &rect);
            }
        }
    }

    /// Render an alignment guide across the moving box and its sibling.
    fn render_guide(&mut self, guide: &pinboard_core::snap::Guide, transform: Affine) {
        let line = if guide.kind.is_vertical() {
            Line::new((guide.position, guide.start), (guide.position, guide.end))
        } else {
            Line::new((guide.start, guide.position), (guide.end, guide.position))
        };
        let stroke = Stroke::new(1.0 / self.zoom);
        self.scene.stroke(&stroke, transform, self.guide_color, None, &line);
    }

    /// Thin spoke from the rotation center showing the current angle.
    fn render_rotation_hint(&mut self, selection: &SelectionOverlay, angle: f64, transform: Affine) {
        if selection.handles.is_empty() {
            return;
        }
        let center = selection.rect.center();
        let radius = selection.rect.width().min(selection.rect.height()) / 2.0;
        let tip = center + Vec2::new(radius * angle.sin(), -radius * angle.cos());
        let stroke = Stroke::new(1.0 / self.zoom);
        self.scene
            .stroke(&stroke, transform, self.guide_color.with_alpha(0.6), None, &Line::new(center, tip));
    }
}

/// Outline of a primitive shape inside `frame`.
fn shape_path(kind: ShapeKind, frame: Rect) -> BezPath {
    match kind {
        ShapeKind::Rectangle => frame.to_path(0.1),
        ShapeKind::Ellipse => Ellipse::from_rect(frame).to_path(0.1),
        ShapeKind::Diamond => {
            let c = frame.center();
            let mut path = BezPath::new();
            path.move_to(Point::new(c.x, frame.y0));
            path.line_to(Point::new(frame.x1, c.y));
            path.line_to(Point::new(c.x, frame.y1));
            path.line_to(Point::new(frame.x0, c.y));
            path.close_path();
            path
        }
        ShapeKind::Triangle => {
            let mut path = BezPath::new();
            path.move_to(Point::new(frame.center().x, frame.y0));
            path.line_to(Point::new(frame.x1, frame.y1));
            path.line_to(Point::new(frame.x0, frame.y1));
            path.close_path();
            path
        }
    }
}

/// Title band at the top of composite and menu nodes.
fn header_band(frame: Rect) -> Rect {
    Rect::new(frame.x0, frame.y0, frame.x1, frame.y0 + frame.height() * HEADER_FRACTION)
}

/// Map a rectangle in unit coordinates of `frame` to world coordinates.
fn unit_to_frame(unit: Rect, frame: Rect) -> Rect {
    Rect::new(
        frame.x0 + unit.x0 * frame.width(),
        frame.y0 + unit.y0 * frame.height(),
        frame.x0 + unit.x1 * frame.width(),
        frame.y0 + unit.y1 * frame.height(),
    )
}
