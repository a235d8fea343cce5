//! # Haptics
//!
//! Everything that runs on, or feeds, the `haptics` thread:
//!
//! - [`device`] - the [`HapticDevice`] trait, a null stub, a simulated device and the
//!   [`DeviceHandler`] that enumerates them
//! - [`tool`] - the [`ToolCursor`] that maps device motion into the scene and the
//!   [`ToolState`] snapshot published to the graphics thread
//! - [`contact`] - one-sided plane contact with a proxy that never enters the surface
//! - [`haptic_loop`] - the loop thread, its state machine and shutdown handshake

pub mod contact;
pub mod device;
pub mod haptic_loop;
pub mod tool;

use thiserror::Error;

pub use contact::{ContactResult, PlaneContact};
pub use device::{
    DeviceHandler, DeviceMonitor, DeviceSpecifications, HapticDevice, NullDevice, VirtualDevice,
};
pub use haptic_loop::{HapticLoop, HapticWorld, LoopControl, LoopSettings, LoopState};
pub use tool::{ToolCursor, ToolState};

/// Errors raised by haptic device operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HapticError {
    #[error("device is not open")]
    NotOpen,

    #[error("no haptic device at index {0}")]
    NoDevice(usize),

    #[error("device I/O failed: {0}")]
    Io(String),
}
