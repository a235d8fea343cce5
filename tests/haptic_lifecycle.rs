//! Haptic thread lifecycle against the virtual, null and a failing device

use std::thread;
use std::time::{Duration, Instant};

use bumpview::config::{DeviceSelection, HapticsConfig};
use bumpview::error::AppError;
use bumpview::gfx::resources::SpotLight;
use bumpview::gfx::scene::{build_scene_graph, place_light};
use bumpview::haptics::{
    DeviceHandler, DeviceSpecifications, HapticDevice, HapticError, LoopState, VirtualDevice,
};
use bumpview::lifecycle::{acquire_device, attach_tool, haptic_world, spawn_haptics, stop_haptics};
use cgmath::{Vector3, Zero};

fn config() -> HapticsConfig {
    HapticsConfig {
        rate_limit_hz: Some(1000),
        shutdown_timeout: Duration::from_secs(2),
        shutdown_poll_interval: Duration::from_millis(20),
        ..HapticsConfig::default()
    }
}

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn start(device: Box<dyn HapticDevice>, config: &HapticsConfig) -> bumpview::haptics::HapticLoop {
    let (mut graph, nodes) = build_scene_graph();
    place_light(&mut graph, &nodes, &SpotLight::default());
    let tool = attach_tool(device, config).unwrap();
    spawn_haptics(haptic_world(graph, &nodes, tool), config).unwrap()
}

#[test]
fn virtual_device_runs_and_stops_cleanly() {
    let config = config();
    let device = VirtualDevice::new();
    let monitor = device.monitor();

    let mut haptics = start(Box::new(device), &config);
    assert!(wait_for(|| haptics.latest().tick > 10));
    assert_eq!(haptics.state(), LoopState::Running);

    stop_haptics(haptics, &config).unwrap();

    let activity = monitor.snapshot();
    assert!(!activity.open);
    assert_eq!(activity.closed_count, 1);
    assert!(activity.gripper_user_switch);
    assert!(!activity.io_while_closed);
    assert_eq!(activity.last_force, Vector3::zero());
}

#[test]
fn stop_request_finishes_within_one_tick() {
    let config = config();
    let mut haptics = start(Box::new(VirtualDevice::new()), &config);
    assert!(wait_for(|| haptics.latest().tick > 20));

    haptics.request_stop();
    let tick_at_request = haptics.latest().tick;
    assert!(haptics.wait_stopped(config.shutdown_timeout, config.shutdown_poll_interval));
    assert_eq!(haptics.state(), LoopState::Stopped);

    // only an iteration already past its running check may still publish
    let final_tick = haptics.latest().tick;
    assert!(
        final_tick <= tick_at_request + 1,
        "{final_tick} ticks after a stop requested at {tick_at_request}"
    );

    stop_haptics(haptics, &config).unwrap();
}

#[test]
fn missing_device_falls_back_to_null_device() {
    let config = config();
    let mut handler = DeviceHandler::new(DeviceSelection::None);
    let device = acquire_device(&mut handler, &config).unwrap();
    assert_eq!(device.specifications().max_linear_stiffness, 0.0);

    let mut haptics = start(device, &config);
    assert!(wait_for(|| haptics.latest().tick > 5));
    assert_eq!(haptics.latest().force, [0.0; 3]);

    stop_haptics(haptics, &config).unwrap();
}

#[test]
fn missing_device_is_fatal_when_required() {
    let config = HapticsConfig {
        require_device: true,
        ..config()
    };
    let mut handler = DeviceHandler::new(DeviceSelection::None);
    let err = acquire_device(&mut handler, &config).err().unwrap();
    assert!(matches!(err, AppError::MissingHapticDevice));
    assert_eq!(err.exit_code(), 1);
}

/// Opens fine, then fails every read after a few ticks
struct FailingDevice {
    specs: DeviceSpecifications,
    reads: u32,
}

impl HapticDevice for FailingDevice {
    fn specifications(&self) -> &DeviceSpecifications {
        &self.specs
    }

    fn open(&mut self) -> Result<(), HapticError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), HapticError> {
        Ok(())
    }

    fn position(&mut self) -> Result<Vector3<f64>, HapticError> {
        self.reads += 1;
        if self.reads > 3 {
            Err(HapticError::Io("cable unplugged".to_string()))
        } else {
            Ok(Vector3::zero())
        }
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

#[test]
fn device_error_stops_the_loop() {
    let config = config();
    let device = FailingDevice {
        specs: DeviceSpecifications {
            model_name: "failing".to_string(),
            max_linear_force: 1.0,
            max_linear_stiffness: 100.0,
            workspace_radius: 0.05,
        },
        reads: 0,
    };

    let haptics = start(Box::new(device), &config);
    assert!(wait_for(|| haptics.state() == LoopState::Stopped));

    // stopping an already stopped loop still joins and releases the tool
    stop_haptics(haptics, &config).unwrap();
}
