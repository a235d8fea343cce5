// src/lib.rs
//! bumpview
//!
//! Haptic bump/parallax-mapping demo built on wgpu and winit: a textured plane
//! rendered into two split-screen camera views on the main thread, with a
//! dedicated haptics thread computing contact forces against the same plane.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod haptics;
pub mod input;
pub mod lifecycle;
pub mod performance;
pub mod state;
pub mod ui;
pub mod wgpu_utils;

pub use app::BumpviewApp;
pub use config::AppConfig;
pub use error::AppError;
