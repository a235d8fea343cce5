//! Core rendering functionality
//!
//! Render pipelines, off-screen view framebuffers, on-screen view panels and the
//! per-frame render sequence.

pub mod framebuffer;
pub mod pipeline_manager;
pub mod render_engine;
pub mod view_panel;

pub use framebuffer::{eye_viewports, Framebuffer, Viewport};
pub use pipeline_manager::{DepthMode, PipelineConfig, PipelineManager, PipelineStats, VertexInput};
pub use render_engine::{FrameOutcome, RenderEngine};
pub use view_panel::{PanelRect, ViewLayout, ViewPanel};
