//! Renderer trait abstraction.

use crate::animation::AnimationState;
use peniko::Color;
use pinboard_core::BoardState;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Colors and thresholds used when painting a board.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub background_color: Color,
    /// Selection boxes, handles and the marquee.
    pub selection_color: Color,
    /// Alignment guides.
    pub guide_color: Color,
    /// Layer drawn over everything outside the focus target.
    pub dim_color: Color,
    /// Below this zoom nodes are painted as flat placeholders.
    pub lod_zoom_threshold: f64,
    /// Extra screen-pixel margin kept around the visible area when culling.
    pub cull_margin_px: f64,
    pub handle_size_px: f64,
    pub rotate_handle_offset_px: f64,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background_color: Color::from_rgba8(250, 250, 250, 255),
            selection_color: Color::from_rgba8(59, 130, 246, 255), // Blue
            guide_color: Color::from_rgba8(236, 72, 153, 220),
            dim_color: Color::from_rgba8(15, 23, 42, 140),
            lod_zoom_threshold: 0.35,
            cull_margin_px: 64.0,
            handle_size_px: 10.0,
            rotate_handle_offset_px: 24.0,
            scale_factor: 1.0,
        }
    }
}

impl RenderOptions {
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    pub fn with_guide_color(mut self, color: Color) -> Self {
        self.guide_color = color;
        self
    }

    pub fn with_dim_color(mut self, color: Color) -> Self {
        self.dim_color = color;
        self
    }

    pub fn with_lod_threshold(mut self, zoom: f64) -> Self {
        self.lod_zoom_threshold = zoom;
        self
    }

    pub fn with_cull_margin(mut self, margin_px: f64) -> Self {
        self.cull_margin_px = margin_px;
        self
    }

    /// Match handle geometry to the editor's hit-testing sizes.
    pub fn with_handle_metrics(mut self, handle_size_px: f64, rotate_offset_px: f64) -> Self {
        self.handle_size_px = handle_size_px;
        self.rotate_handle_offset_px = rotate_offset_px;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Reject options no frame can be painted with.
    pub fn validate(&self) -> RenderResult<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(RendererError::InitFailed(format!(
                "scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if !(self.handle_size_px > 0.0) || self.rotate_handle_offset_px < 0.0 {
            return Err(RendererError::InitFailed("invalid handle metrics".to_string()));
        }
        if self.cull_margin_px < 0.0 {
            return Err(RendererError::InitFailed("negative cull margin".to_string()));
        }
        Ok(())
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The board to render.
    pub state: &'a BoardState,
    pub options: RenderOptions,
    /// Transition values; without them nodes paint in their resting state.
    pub animation: Option<&'a AnimationState>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(state: &'a BoardState) -> Self {
        Self {
            state,
            options: RenderOptions::default(),
            animation: None,
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_animation(mut self, animation: &'a AnimationState) -> Self {
        self.animation = Some(animation);
        self
    }
}

/// Trait for rendering backends.
///
/// Implementations can use Vello, wgpu directly, or other rendering engines.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    ///
    /// This method is called once per frame and should prepare all drawing commands.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Validate the options, then build the scene.
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        ctx.options.validate()?;
        self.build_scene(ctx);
        Ok(())
    }

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.options.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(RenderOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = RenderOptions::default().with_scale_factor(0.0);
        assert!(matches!(options.validate(), Err(RendererError::InitFailed(_))));

        let options = RenderOptions::default().with_handle_metrics(0.0, 24.0);
        assert!(options.validate().is_err());

        let options = RenderOptions::default().with_cull_margin(-1.0);
        assert!(options.validate().is_err());
    }
}
