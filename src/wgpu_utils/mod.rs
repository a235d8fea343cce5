//! Small wgpu helpers shared by the renderer
//!
//! [`binding_builder`] numbers bind group entries by insertion order so layouts
//! and bind groups are written side by side; [`uniform_buffer`] wraps a single
//! `Pod` value uploaded on change.

pub mod binding_builder;
pub mod uniform_buffer;

pub use binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};
pub use uniform_buffer::UniformBuffer;
