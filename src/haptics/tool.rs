//! Tool cursor
//!
//! The tool is the scene's representation of the haptic handle. Device positions
//! are scaled from the device workspace into the virtual workspace; the proxy is
//! the contact-constrained twin of the device position.

use std::time::Duration;

use cgmath::{InnerSpace, Vector3, Zero};
use log::{info, warn};

use super::{device::HapticDevice, HapticError};
use crate::gfx::scene::graph::Pose;

/// Snapshot of the tool published by the haptic loop every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolState {
    pub tick: u64,
    pub device_position: [f64; 3],
    pub proxy_position: [f64; 3],
    pub force: [f64; 3],
    pub in_contact: bool,
    /// Time since the previous loop iteration
    pub last_interval: Duration,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            tick: 0,
            device_position: [0.0; 3],
            proxy_position: [0.0; 3],
            force: [0.0; 3],
            in_contact: false,
            last_interval: Duration::ZERO,
        }
    }
}

pub struct ToolCursor {
    device: Box<dyn HapticDevice>,
    radius: f64,
    workspace_scale: f64,
    device_global_position: Vector3<f64>,
    proxy_global_position: Vector3<f64>,
    force: Vector3<f64>,
    started: bool,
}

impl ToolCursor {
    /// Attaches `device` to a tool of the given radius
    ///
    /// The device workspace is scaled so that it spans `workspace_radius` in the scene.
    pub fn new(device: Box<dyn HapticDevice>, radius: f64, workspace_radius: f64) -> Self {
        let device_radius = device.specifications().workspace_radius;
        let workspace_scale = if device_radius > 0.0 {
            workspace_radius / device_radius
        } else {
            1.0
        };

        Self {
            device,
            radius,
            workspace_scale,
            device_global_position: Vector3::zero(),
            proxy_global_position: Vector3::zero(),
            force: Vector3::zero(),
            started: false,
        }
    }

    /// Opens the device and enables the gripper as a user switch
    pub fn start(&mut self) -> Result<(), HapticError> {
        self.device.open()?;
        self.device.set_enable_gripper_user_switch(true);
        self.started = true;
        info!(
            "Tool attached to {} (workspace scale {:.1})",
            self.device.specifications().model_name,
            self.workspace_scale
        );
        Ok(())
    }

    /// Sends a zero force and closes the device
    pub fn stop(&mut self) -> Result<(), HapticError> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.force = Vector3::zero();
        let zeroed = self
            .device
            .set_force_and_torque(Vector3::zero(), Vector3::zero());
        let closed = self.device.close();
        zeroed.and(closed)
    }

    /// Reads the device and places the tool in the frame of `parent`
    pub fn update_from_device(&mut self, parent: &Pose) -> Result<(), HapticError> {
        let local = self.device.position()? * self.workspace_scale;
        self.device_global_position = parent.transform_point(local);
        Ok(())
    }

    pub fn set_contact(&mut self, proxy: Vector3<f64>, force: Vector3<f64>) {
        self.proxy_global_position = proxy;
        self.force = force;
    }

    /// Sends the current force with zero torque, clamped to the device's limit
    pub fn apply_force(&mut self) -> Result<(), HapticError> {
        let limit = self.device.specifications().max_linear_force;
        let force = clamp_magnitude(self.force, limit);
        self.device.set_force_and_torque(force, Vector3::zero())
    }

    /// Best-effort zero force after a device failure
    pub fn release_force(&mut self) {
        self.force = Vector3::zero();
        if let Err(e) = self
            .device
            .set_force_and_torque(Vector3::zero(), Vector3::zero())
        {
            warn!("Failed to zero device force: {e}");
        }
    }

    pub fn user_switch(&mut self, index: usize) -> Result<bool, HapticError> {
        self.device.user_switch(index)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn workspace_scale(&self) -> f64 {
        self.workspace_scale
    }

    /// Highest contact stiffness the device can render in scene units
    pub fn max_stiffness(&self) -> f64 {
        self.device.specifications().max_linear_stiffness / self.workspace_scale
    }

    pub fn device_global_position(&self) -> Vector3<f64> {
        self.device_global_position
    }

    pub fn proxy_global_position(&self) -> Vector3<f64> {
        self.proxy_global_position
    }

    pub fn force(&self) -> Vector3<f64> {
        self.force
    }
}

fn clamp_magnitude(force: Vector3<f64>, limit: f64) -> Vector3<f64> {
    let magnitude = force.magnitude();
    if magnitude > limit && magnitude > 0.0 {
        force * (limit.max(0.0) / magnitude)
    } else {
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::device::{NullDevice, VirtualDevice};

    #[test]
    fn test_workspace_scaling() {
        let tool = ToolCursor::new(Box::new(VirtualDevice::new()), 0.02, 0.9);
        assert!((tool.workspace_scale() - 22.5).abs() < 1e-12);
        assert!((tool.max_stiffness() - 2000.0 / 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_device_position_is_scaled_into_parent_frame() {
        let device = VirtualDevice::with_trajectory(|_| Vector3::new(0.01, 0.0, -0.02));
        let mut tool = ToolCursor::new(Box::new(device), 0.02, 0.9);
        tool.start().unwrap();
        let parent = Pose::from_position(Vector3::new(0.0, 0.0, 1.0));
        tool.update_from_device(&parent).unwrap();
        let p = tool.device_global_position();
        assert!((p.x - 0.225).abs() < 1e-12);
        assert!((p.z - (1.0 - 0.45)).abs() < 1e-12);
    }

    #[test]
    fn test_force_is_clamped_to_device_limit() {
        let device = VirtualDevice::new();
        let monitor = device.monitor();
        let mut tool = ToolCursor::new(Box::new(device), 0.02, 0.9);
        tool.start().unwrap();
        tool.set_contact(Vector3::zero(), Vector3::new(0.0, 0.0, 20.0));
        tool.apply_force().unwrap();
        assert!((monitor.snapshot().last_force.z - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_stop_zeroes_force_and_closes() {
        let device = VirtualDevice::new();
        let monitor = device.monitor();
        let mut tool = ToolCursor::new(Box::new(device), 0.02, 0.9);
        tool.start().unwrap();
        assert!(monitor.snapshot().gripper_user_switch);
        tool.set_contact(Vector3::zero(), Vector3::new(1.0, 0.0, 0.0));
        tool.apply_force().unwrap();

        tool.stop().unwrap();
        let activity = monitor.snapshot();
        assert_eq!(activity.last_force, Vector3::zero());
        assert!(!activity.open);
        assert_eq!(activity.closed_count, 1);

        // second stop is a no-op
        tool.stop().unwrap();
        assert_eq!(monitor.snapshot().closed_count, 1);
    }

    #[test]
    fn test_null_device_has_no_stiffness() {
        let tool = ToolCursor::new(Box::new(NullDevice::new()), 0.02, 0.9);
        assert_eq!(tool.max_stiffness(), 0.0);
    }
}
