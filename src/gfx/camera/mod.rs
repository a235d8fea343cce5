pub mod camera_controller;
pub mod camera_utils;
pub mod view_camera;

// Re-export main types
pub use camera_controller::{CameraController, CameraStep};
pub use view_camera::{Eye, ViewCamera};
