use cgmath::{
    perspective, Deg, EuclideanSpace, InnerSpace, Matrix3, Matrix4, Point3, Vector3,
};

use super::camera_utils::OPENGL_TO_WGPU_MATRIX;
use crate::config::StereoMode;

/// Which eye a view matrix is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Mono,
    Left,
    Right,
}

/// Camera with an explicit position, look and up vector
///
/// Poses are expressed in the camera's parent frame, which is the world.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCamera {
    position: Vector3<f64>,
    look: Vector3<f64>,
    up: Vector3<f64>,
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub stereo: StereoMode,
    pub eye_separation: f64,
    pub focal_length: f64,
}

impl ViewCamera {
    pub fn new(eye: Vector3<f64>, target: Vector3<f64>, up: Vector3<f64>) -> Self {
        let mut camera = Self {
            position: eye,
            look: Vector3::unit_x(),
            up: Vector3::unit_z(),
            fov_deg: 45.0,
            near: 0.01,
            far: 10.0,
            stereo: StereoMode::Disabled,
            eye_separation: 0.03,
            focal_length: 3.0,
        };
        camera.set(eye, target, up);
        camera
    }

    /// Places the camera at `eye` looking at `target`; `up` is re-orthogonalised
    pub fn set(&mut self, eye: Vector3<f64>, target: Vector3<f64>, up: Vector3<f64>) {
        let look = (target - eye).normalize();
        let right = look.cross(up).normalize();
        self.position = eye;
        self.look = look;
        self.up = right.cross(look).normalize();
    }

    pub fn with_stereo(mut self, stereo: StereoMode) -> Self {
        self.stereo = stereo;
        self
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn look(&self) -> Vector3<f64> {
        self.look
    }

    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    pub fn right(&self) -> Vector3<f64> {
        self.look.cross(self.up).normalize()
    }

    pub fn translate(&mut self, delta: Vector3<f64>) {
        self.position += delta;
    }

    /// Rotates the view direction about a world axis through the camera position
    pub fn rotate_about_world_axis(&mut self, axis: Vector3<f64>, degrees: f64) {
        let rotation = Matrix3::from_axis_angle(axis.normalize(), Deg(degrees));
        self.look = (rotation * self.look).normalize();
        self.up = (rotation * self.up).normalize();
    }

    /// Tilts the camera about its own right axis
    pub fn rotate_about_right_axis(&mut self, degrees: f64) {
        let right = self.right();
        self.rotate_about_world_axis(right, degrees);
    }

    /// Position, look and up vectors with three decimals
    pub fn pose_report(&self) -> String {
        format!(
            "{}\n{}\n{}",
            format_vector(self.position),
            format_vector(self.look),
            format_vector(self.up)
        )
    }

    pub fn view_matrix(&self, eye: Eye) -> Matrix4<f32> {
        let eye_position = self.eye_world(eye);
        let focus = self.position + self.look * self.focal_length;

        Matrix4::look_at_rh(
            Point3::from_vec(to_f32(eye_position)),
            Point3::from_vec(to_f32(focus)),
            to_f32(self.up),
        )
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * perspective(
                Deg(self.fov_deg as f32),
                aspect.max(f32::EPSILON),
                self.near as f32,
                self.far as f32,
            )
    }

    pub fn view_projection(&self, eye: Eye, aspect: f32) -> Matrix4<f32> {
        self.projection_matrix(aspect) * self.view_matrix(eye)
    }

    /// Eye position in world space as used by the shaders
    pub fn eye_position(&self, eye: Eye) -> [f32; 4] {
        let p = self.eye_world(eye);
        [p.x as f32, p.y as f32, p.z as f32, 1.0]
    }

    fn eye_world(&self, eye: Eye) -> Vector3<f64> {
        let offset = match eye {
            Eye::Mono => 0.0,
            Eye::Left => -0.5 * self.eye_separation,
            Eye::Right => 0.5 * self.eye_separation,
        };
        self.position + self.right() * offset
    }
}

fn to_f32(v: Vector3<f64>) -> Vector3<f32> {
    Vector3::new(v.x as f32, v.y as f32, v.z as f32)
}

fn format_vector(v: Vector3<f64>) -> String {
    format!("{:.3}, {:.3}, {:.3}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Zero;

    fn approx(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).magnitude() < 1e-9
    }

    #[test]
    fn test_set_orthonormalises_up() {
        let camera = ViewCamera::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zero(),
            Vector3::new(0.3, 0.0, 1.0),
        );
        assert!(approx(camera.look(), Vector3::new(-1.0, 0.0, 0.0)));
        assert!(approx(camera.up(), Vector3::unit_z()));
        assert!(camera.look().dot(camera.up()).abs() < 1e-12);
    }

    #[test]
    fn test_world_rotation_keeps_position() {
        let mut camera = ViewCamera::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zero(),
            Vector3::unit_z(),
        );
        camera.rotate_about_world_axis(Vector3::unit_z(), 90.0);
        assert!(approx(camera.position(), Vector3::new(1.0, 0.0, 0.0)));
        assert!(approx(camera.look(), Vector3::new(0.0, -1.0, 0.0)));
        assert!(approx(camera.up(), Vector3::unit_z()));
    }

    #[test]
    fn test_right_axis_rotation_tilts_look() {
        let mut camera = ViewCamera::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zero(),
            Vector3::unit_z(),
        );
        camera.rotate_about_right_axis(90.0);
        // right is +y here, so the look vector swings onto the old up direction
        assert!(approx(camera.look(), Vector3::unit_z()) || approx(camera.look(), -Vector3::unit_z()));
        assert!(camera.look().dot(camera.up()).abs() < 1e-9);
    }

    #[test]
    fn test_pose_report_format() {
        let camera = ViewCamera::new(
            Vector3::new(1.5, 0.0, -0.27),
            Vector3::zero(),
            Vector3::unit_z(),
        );
        let report = camera.pose_report();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1.500, 0.000, -0.270");
    }

    #[test]
    fn test_stereo_eyes_straddle_mono() {
        let camera = ViewCamera::new(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::zero(),
            Vector3::unit_z(),
        );
        let left = camera.eye_position(Eye::Left);
        let right = camera.eye_position(Eye::Right);
        let mono = camera.eye_position(Eye::Mono);
        assert!(((left[1] + right[1]) * 0.5 - mono[1]).abs() < 1e-6);
        assert!(((right[1] - left[1]).abs() - 0.03).abs() < 1e-6);
    }
}
