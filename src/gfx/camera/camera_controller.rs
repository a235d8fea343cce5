use cgmath::Vector3;

use super::view_camera::ViewCamera;

/// Translates navigation input into camera motion
///
/// Keyboard steps move the camera along world axes; mouse drags turn it about the
/// world up axis (horizontal motion) and its own right axis (vertical motion).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    /// Degrees per pixel of drag
    pub rotate_speed: f64,
    /// World units per key press
    pub step: f64,
}

/// Direction of a single keyboard translation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStep {
    XNegative,
    XPositive,
    YNegative,
    YPositive,
    ZNegative,
    ZPositive,
}

impl CameraController {
    pub fn new(rotate_speed: f64, step: f64) -> Self {
        Self { rotate_speed, step }
    }

    pub fn step(&self, camera: &mut ViewCamera, direction: CameraStep) {
        let s = self.step;
        let delta = match direction {
            CameraStep::XNegative => Vector3::new(-s, 0.0, 0.0),
            CameraStep::XPositive => Vector3::new(s, 0.0, 0.0),
            CameraStep::YNegative => Vector3::new(0.0, -s, 0.0),
            CameraStep::YPositive => Vector3::new(0.0, s, 0.0),
            CameraStep::ZNegative => Vector3::new(0.0, 0.0, -s),
            CameraStep::ZPositive => Vector3::new(0.0, 0.0, s),
        };
        camera.translate(delta);
    }

    /// `dx`/`dy` are last cursor position minus current, in pixels
    pub fn drag(&self, camera: &mut ViewCamera, dx: f64, dy: f64) {
        camera.rotate_about_world_axis(Vector3::unit_z(), dx * self.rotate_speed);
        camera.rotate_about_right_axis(dy * self.rotate_speed);
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(0.01, 0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Zero};

    fn camera() -> ViewCamera {
        ViewCamera::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zero(), Vector3::unit_z())
    }

    #[test]
    fn test_steps_move_along_world_axes() {
        let controller = CameraController::default();
        let mut cam = camera();
        controller.step(&mut cam, CameraStep::XNegative);
        controller.step(&mut cam, CameraStep::YPositive);
        controller.step(&mut cam, CameraStep::ZPositive);
        let p = cam.position();
        assert!((p - Vector3::new(0.99, 0.01, 0.01)).magnitude() < 1e-12);
    }

    #[test]
    fn test_horizontal_drag_turns_about_world_up() {
        let controller = CameraController::default();
        let mut cam = camera();
        // 9000 px at 1/100 degree per px = 90 degrees
        controller.drag(&mut cam, 9000.0, 0.0);
        assert!((cam.look() - Vector3::new(0.0, -1.0, 0.0)).magnitude() < 1e-9);
        assert!((cam.position() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-12);
    }

    #[test]
    fn test_zero_drag_is_identity() {
        let controller = CameraController::default();
        let mut cam = camera();
        let before = cam.clone();
        controller.drag(&mut cam, 0.0, 0.0);
        assert!((cam.look() - before.look()).magnitude() < 1e-12);
        assert!((cam.up() - before.up()).magnitude() < 1e-12);
    }
}
