//! One-sided plane contact
//!
//! God-object style: the proxy follows the device freely above the plane and is
//! held on the surface (offset by the tool radius) once the device pushes through
//! the front face. Approaching from behind or from outside the plane's extents
//! produces no contact. The rendered force is a spring between proxy and device.

use cgmath::Vector3;

use crate::gfx::scene::graph::Pose;

const SURFACE_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResult {
    pub proxy: Vector3<f64>,
    pub force: Vector3<f64>,
    pub in_contact: bool,
}

/// Finite plane in its node's xy plane, front face along local +z
#[derive(Debug, Clone)]
pub struct PlaneContact {
    half_width: f64,
    half_height: f64,
    stiffness: f64,
    /// Local z of the proxy after the previous update, `None` before the first
    previous_proxy_z: Option<f64>,
}

impl PlaneContact {
    pub fn new(width: f64, height: f64, stiffness: f64) -> Self {
        Self {
            half_width: 0.5 * width,
            half_height: 0.5 * height,
            stiffness,
            previous_proxy_z: None,
        }
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    /// Updates the proxy for a tool of `radius` at world position `device`
    pub fn compute(&mut self, plane: &Pose, device: Vector3<f64>, radius: f64) -> ContactResult {
        let local = plane.inverse_transform_point(device);

        let within_extents = local.x.abs() <= self.half_width && local.y.abs() <= self.half_height;
        // the first sample only decides which side the tool starts on
        let was_in_front = self
            .previous_proxy_z
            .map_or(local.z >= 0.0, |z| z >= radius - SURFACE_EPSILON);
        let in_contact = within_extents && was_in_front && local.z < radius;

        let proxy_local = if in_contact {
            Vector3::new(local.x, local.y, radius)
        } else {
            local
        };
        self.previous_proxy_z = Some(proxy_local.z);

        let force_local = (proxy_local - local) * self.stiffness;

        ContactResult {
            proxy: plane.transform_point(proxy_local),
            force: plane.transform_vector(force_local),
            in_contact,
        }
    }
}
