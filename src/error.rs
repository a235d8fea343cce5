//! Error types for the bumpview application
//!
//! Startup failures map onto process exit codes: environment problems (event loop,
//! window, GPU surface) exit with `1`, required resources that fail to load exit
//! with `-1`.

use std::path::PathBuf;

use thiserror::Error;

use crate::haptics::HapticError;

/// Exit code for windowing or GPU initialization failures
pub const EXIT_ENVIRONMENT: i32 = 1;
/// Exit code for required resources that could not be loaded
pub const EXIT_RESOURCE: i32 = -1;

/// Errors that stop the application before or during the main loop
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize the event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to load {what} from {}: {reason}", path.display())]
    ResourceLoad {
        what: &'static str,
        path: PathBuf,
        reason: String,
    },

    #[error("no haptic device found and a device is required")]
    MissingHapticDevice,

    #[error("haptic device error: {0}")]
    Haptic(#[from] HapticError),

    #[error("failed to spawn haptics thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("haptics thread did not stop within {0:?}")]
    ShutdownTimeout(std::time::Duration),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::ResourceLoad { .. } => EXIT_RESOURCE,
            _ => EXIT_ENVIRONMENT,
        }
    }

    /// Whether the process should pause briefly before exiting so the message stays visible
    pub fn delays_exit(&self) -> bool {
        matches!(
            self,
            AppError::EventLoop(_)
                | AppError::WindowCreation(_)
                | AppError::Surface(_)
                | AppError::Adapter(_)
                | AppError::Device(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_failures_exit_with_minus_one() {
        let err = AppError::ResourceLoad {
            what: "normal map",
            path: PathBuf::from("images/toy_box_normal.png"),
            reason: "not found".to_string(),
        };
        assert_eq!(err.exit_code(), -1);
        assert!(!err.delays_exit());
        assert!(err.to_string().contains("toy_box_normal.png"));
    }

    #[test]
    fn environment_failures_exit_with_one() {
        assert_eq!(AppError::MissingHapticDevice.exit_code(), 1);
        let spawn = AppError::ThreadSpawn(std::io::Error::other("no threads"));
        assert_eq!(spawn.exit_code(), 1);
    }
}
