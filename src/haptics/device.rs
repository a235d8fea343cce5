//! Haptic device abstraction
//!
//! Real drivers are out of scope; the application ships two implementations:
//! [`NullDevice`], an explicit "nothing connected" stub that reports a fixed position
//! and ignores forces, and [`VirtualDevice`], which follows a scripted trajectory so
//! the contact model has something to push against.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Instant;

use cgmath::{Vector3, Zero};
use log::{debug, info};
use parking_lot::Mutex;

use super::HapticError;
use crate::config::DeviceSelection;

/// Static capabilities of a device
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpecifications {
    pub model_name: String,
    /// Newtons
    pub max_linear_force: f64,
    /// Newtons per metre
    pub max_linear_stiffness: f64,
    /// Metres
    pub workspace_radius: f64,
}

/// Force-feedback input device
///
/// Positions are in the device's own frame, in metres.
pub trait HapticDevice: Send {
    fn specifications(&self) -> &DeviceSpecifications;

    fn open(&mut self) -> Result<(), HapticError>;

    fn close(&mut self) -> Result<(), HapticError>;

    fn position(&mut self) -> Result<Vector3<f64>, HapticError>;

    fn set_force_and_torque(
        &mut self,
        force: Vector3<f64>,
        torque: Vector3<f64>,
    ) -> Result<(), HapticError>;

    fn user_switch(&mut self, index: usize) -> Result<bool, HapticError>;

    /// Lets the gripper act as a user switch on devices that have one
    fn set_enable_gripper_user_switch(&mut self, enabled: bool);
}

/// Stand-in used when no device is connected
///
/// Reports the workspace origin and zero capabilities, so every force computed
/// against it is zero.
pub struct NullDevice {
    specs: DeviceSpecifications,
    open: bool,
}

impl NullDevice {
    pub fn new() -> Self {
        Self {
            specs: DeviceSpecifications {
                model_name: "no device".to_string(),
                max_linear_force: 0.0,
                max_linear_stiffness: 0.0,
                workspace_radius: 1.0,
            },
            open: false,
        }
    }
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HapticDevice for NullDevice {
    fn specifications(&self) -> &DeviceSpecifications {
        &self.specs
    }

    fn open(&mut self) -> Result<(), HapticError> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), HapticError> {
        self.open = false;
        Ok(())
    }

    fn position(&mut self) -> Result<Vector3<f64>, HapticError> {
        if !self.open {
            return Err(HapticError::NotOpen);
        }
        Ok(Vector3::zero())
    }

    fn set_force_and_torque(
        &mut self,
        _force: Vector3<f64>,
        _torque: Vector3<f64>,
    ) -> Result<(), HapticError> {
        Ok(())
    }

    fn user_switch(&mut self, _index: usize) -> Result<bool, HapticError> {
        Ok(false)
    }

    fn set_enable_gripper_user_switch(&mut self, _enabled: bool) {}
}

/// Record of everything a [`VirtualDevice`] was asked to do
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceActivity {
    pub open: bool,
    pub opened_count: u32,
    pub closed_count: u32,
    pub force_writes: u64,
    pub last_force: Vector3<f64>,
    /// Any position read or force write attempted while closed
    pub io_while_closed: bool,
    pub gripper_user_switch: bool,
}

impl Default for DeviceActivity {
    fn default() -> Self {
        Self {
            open: false,
            opened_count: 0,
            closed_count: 0,
            force_writes: 0,
            last_force: Vector3::zero(),
            io_while_closed: false,
            gripper_user_switch: false,
        }
    }
}

/// Shared view of a virtual device's activity, for diagnostics and tests
#[derive(Debug, Clone, Default)]
pub struct DeviceMonitor {
    inner: Arc<Mutex<DeviceActivity>>,
}

impl DeviceMonitor {
    pub fn snapshot(&self) -> DeviceActivity {
        self.inner.lock().clone()
    }
}

type Trajectory = Box<dyn Fn(f64) -> Vector3<f64> + Send>;

/// Simulated device that sweeps its handle along a fixed path
///
/// The default path circles 2 cm around the workspace centre every 4 s while
/// bobbing between +1 cm and -3 cm on z every 3 s, which drives the scaled tool
/// through the plane once per vertical period.
pub struct VirtualDevice {
    specs: DeviceSpecifications,
    trajectory: Trajectory,
    epoch: Instant,
    monitor: DeviceMonitor,
}

impl VirtualDevice {
    pub fn new() -> Self {
        Self::with_trajectory(default_trajectory)
    }

    /// Virtual device whose handle sits at `trajectory(t)` after `t` seconds
    pub fn with_trajectory<F>(trajectory: F) -> Self
    where
        F: Fn(f64) -> Vector3<f64> + Send + 'static,
    {
        Self {
            specs: DeviceSpecifications {
                model_name: "virtual device".to_string(),
                max_linear_force: 8.0,
                max_linear_stiffness: 2000.0,
                workspace_radius: 0.04,
            },
            trajectory: Box::new(trajectory),
            epoch: Instant::now(),
            monitor: DeviceMonitor::default(),
        }
    }

    pub fn monitor(&self) -> DeviceMonitor {
        self.monitor.clone()
    }

    fn check_open(&self) -> Result<(), HapticError> {
        let mut activity = self.monitor.inner.lock();
        if activity.open {
            Ok(())
        } else {
            activity.io_while_closed = true;
            Err(HapticError::NotOpen)
        }
    }
}

impl Default for VirtualDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn default_trajectory(t: f64) -> Vector3<f64> {
    let planar = TAU * t / 4.0;
    let vertical = TAU * t / 3.0;
    Vector3::new(
        0.02 * planar.cos(),
        0.02 * planar.sin(),
        -0.01 + 0.02 * vertical.cos(),
    )
}

impl HapticDevice for VirtualDevice {
    fn specifications(&self) -> &DeviceSpecifications {
        &self.specs
    }

    fn open(&mut self) -> Result<(), HapticError> {
        let mut activity = self.monitor.inner.lock();
        activity.open = true;
        activity.opened_count += 1;
        self.epoch = Instant::now();
        debug!("{} opened", self.specs.model_name);
        Ok(())
    }

    fn close(&mut self) -> Result<(), HapticError> {
        let mut activity = self.monitor.inner.lock();
        activity.open = false;
        activity.closed_count += 1;
        debug!("{} closed", self.specs.model_name);
        Ok(())
    }

    fn position(&mut self) -> Result<Vector3<f64>, HapticError> {
        self.check_open()?;
        Ok((self.trajectory)(self.epoch.elapsed().as_secs_f64()))
    }

    fn set_force_and_torque(
        &mut self,
        force: Vector3<f64>,
        _torque: Vector3<f64>,
    ) -> Result<(), HapticError> {
        self.check_open()?;
        let mut activity = self.monitor.inner.lock();
        activity.force_writes += 1;
        activity.last_force = force;
        Ok(())
    }

    fn user_switch(&mut self, _index: usize) -> Result<bool, HapticError> {
        self.check_open()?;
        Ok(false)
    }

    fn set_enable_gripper_user_switch(&mut self, enabled: bool) {
        self.monitor.inner.lock().gripper_user_switch = enabled;
    }
}

/// Enumerates the devices available to the application
pub struct DeviceHandler {
    devices: Vec<Option<Box<dyn HapticDevice>>>,
}

impl DeviceHandler {
    pub fn new(selection: DeviceSelection) -> Self {
        let devices: Vec<Box<dyn HapticDevice>> = match selection {
            DeviceSelection::None => Vec::new(),
            DeviceSelection::Virtual => vec![Box::new(VirtualDevice::new())],
        };
        Self::with_devices(devices)
    }

    pub fn with_devices(devices: Vec<Box<dyn HapticDevice>>) -> Self {
        info!("Haptic device handler found {} device(s)", devices.len());
        Self {
            devices: devices.into_iter().map(Some).collect(),
        }
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Hands out the device at `index`; each device can be taken once
    pub fn get_device(&mut self, index: usize) -> Result<Box<dyn HapticDevice>, HapticError> {
        self.devices
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(HapticError::NoDevice(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_device_is_inert() {
        let mut device = NullDevice::new();
        device.open().unwrap();
        assert_eq!(device.position().unwrap(), Vector3::zero());
        assert_eq!(device.specifications().max_linear_stiffness, 0.0);
        device
            .set_force_and_torque(Vector3::new(1.0, 2.0, 3.0), Vector3::zero())
            .unwrap();
        assert!(!device.user_switch(0).unwrap());
    }

    #[test]
    fn test_virtual_device_requires_open() {
        let mut device = VirtualDevice::new();
        let monitor = device.monitor();
        assert_eq!(device.position(), Err(HapticError::NotOpen));
        assert!(monitor.snapshot().io_while_closed);

        device.open().unwrap();
        device
            .set_force_and_torque(Vector3::new(0.0, 0.0, 1.5), Vector3::zero())
            .unwrap();
        let activity = monitor.snapshot();
        assert_eq!(activity.force_writes, 1);
        assert_eq!(activity.last_force.z, 1.5);

        device.close().unwrap();
        assert!(!monitor.snapshot().open);
    }

    #[test]
    fn test_default_trajectory_stays_in_workspace() {
        let radius = VirtualDevice::new().specifications().workspace_radius;
        for i in 0..120 {
            let p = default_trajectory(i as f64 * 0.1);
            let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
            assert!(r <= radius, "{p:?} outside workspace");
            assert!(p.z <= 0.01 + 1e-12 && p.z >= -0.03 - 1e-12);
        }
    }

    #[test]
    fn test_handler_hands_out_each_device_once() {
        let mut handler = DeviceHandler::new(DeviceSelection::Virtual);
        assert_eq!(handler.device_count(), 1);
        assert!(handler.get_device(0).is_ok());
        assert_eq!(handler.get_device(0).err(), Some(HapticError::NoDevice(0)));

        let mut empty = DeviceHandler::new(DeviceSelection::None);
        assert_eq!(empty.device_count(), 0);
        assert!(empty.get_device(0).is_err());
    }
}
