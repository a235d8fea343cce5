//! # Graphics Module
//!
//! Everything on the graphics thread's side of the demo: cameras, procedural
//! geometry, GPU resources, the scene graph and the split-view renderer.
//!
//! ## Architecture Overview
//!
//! - **Cameras** ([`camera`]) - Explicit-pose view cameras with passive stereo
//! - **Geometry** ([`geometry`]) - The plane and sphere marker meshes
//! - **Resources** ([`resources`]) - Textures, materials, uniform bindings, loading
//! - **Scene** ([`scene`]) - Scene graph and the demo's render objects
//! - **Rendering** ([`rendering`]) - Framebuffers, view panels and the render engine
//!
//! ## Frame Structure
//!
//! Each view camera renders into its own off-screen [`rendering::Framebuffer`].
//! The two framebuffers are then drawn side by side into
//! [`rendering::ViewPanel`]s on the window surface, with the UI overlay on top.

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

pub use camera::ViewCamera;
pub use rendering::render_engine::RenderEngine;
