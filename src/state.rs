//! Application state mutated by the input dispatcher and read by the graphics loop
//!
//! Everything here lives on the main thread.

use cgmath::{Vector3, Zero};

use crate::config::StereoMode;
use crate::gfx::camera::{CameraController, ViewCamera};
use crate::gfx::rendering::view_panel::ViewLayout;

pub const HEIGHT_SCALE_STEP: f64 = 0.0005;
pub const HEIGHT_CORRECTION_STEP: f64 = 0.005;

/// Parallax shader parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShaderUniforms {
    /// Displacement scalar, kept in `[0, 1]`
    pub height_scale: f64,
    /// Parallax bias; re-derived from `height_scale`, then freely adjustable
    pub height_correction: f64,
}

impl ShaderUniforms {
    pub fn derived_correction(height_scale: f64) -> f64 {
        0.45977 * height_scale + 0.01
    }

    pub fn adjust_height_scale(&mut self, delta: f64) {
        self.height_scale = (self.height_scale + delta).clamp(0.0, 1.0);
        self.height_correction = Self::derived_correction(self.height_scale);
    }

    pub fn adjust_height_correction(&mut self, delta: f64) {
        self.height_correction += delta;
    }
}

impl Default for ShaderUniforms {
    fn default() -> Self {
        Self {
            height_scale: 0.0,
            height_correction: Self::derived_correction(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseState {
    #[default]
    Idle,
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseInteraction {
    pub state: MouseState,
    /// Last cursor position in window pixels, `None` until the cursor has moved
    /// over the window
    pub cursor: Option<(f64, f64)>,
}

pub struct DemoState {
    /// View 1 is navigable, view 2 is fixed
    pub views: [ViewCamera; 2],
    pub controller: CameraController,
    pub layout: ViewLayout,
    pub uniforms: ShaderUniforms,
    pub mouse: MouseInteraction,
    pub fullscreen: bool,
    pub mirrored: bool,
    pub close_requested: bool,
}

impl DemoState {
    pub fn new(stereo: StereoMode) -> Self {
        let view1 = ViewCamera::new(
            Vector3::new(1.43, 0.4, 0.86),
            Vector3::new(-0.732, -0.252, -0.63),
            Vector3::new(-0.602, -0.180, 0.773),
        )
        .with_stereo(stereo);
        let view2 = ViewCamera::new(
            Vector3::new(1.5, 0.0, -0.27),
            Vector3::zero(),
            Vector3::unit_z(),
        )
        .with_stereo(stereo);

        Self {
            views: [view1, view2],
            controller: CameraController::default(),
            layout: ViewLayout::default(),
            uniforms: ShaderUniforms::default(),
            mouse: MouseInteraction::default(),
            fullscreen: false,
            mirrored: false,
            close_requested: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_uniforms() {
        let uniforms = ShaderUniforms::default();
        assert_eq!(uniforms.height_scale, 0.0);
        assert!((uniforms.height_correction - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_height_scale_saturates() {
        let mut uniforms = ShaderUniforms::default();
        uniforms.adjust_height_scale(-HEIGHT_SCALE_STEP);
        assert_eq!(uniforms.height_scale, 0.0);

        for _ in 0..2500 {
            uniforms.adjust_height_scale(HEIGHT_SCALE_STEP);
        }
        assert_eq!(uniforms.height_scale, 1.0);
        assert!((uniforms.height_correction - 0.46977).abs() < 1e-12);
    }

    #[test]
    fn test_correction_is_unclamped() {
        let mut uniforms = ShaderUniforms::default();
        for _ in 0..10 {
            uniforms.adjust_height_correction(-HEIGHT_CORRECTION_STEP);
        }
        assert!((uniforms.height_correction - (0.01 - 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_initial_views() {
        let state = DemoState::new(StereoMode::Disabled);
        assert_eq!(state.views[1].position(), Vector3::new(1.5, 0.0, -0.27));
        assert_eq!(state.views[0].fov_deg, 45.0);
        assert!(!state.close_requested);
    }
}
