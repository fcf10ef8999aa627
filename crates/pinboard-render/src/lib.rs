//! Pinboard Render Library
//!
//! Turns a [`pinboard_core::BoardState`] into drawing commands. Frame
//! planning and animation are backend independent; the default backend
//! encodes plans into a Vello scene.

mod renderer;

pub mod animation;
pub mod plan;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use animation::{AnimationState, NodeAnimation};
pub use plan::{plan_frame, FocusOverlay, FramePlan, NodeDraw, SelectionOverlay};
pub use renderer::{RenderContext, RenderOptions, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
