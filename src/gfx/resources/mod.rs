//! GPU resource management
//!
//! Handles textures, uniform bindings, materials and loading them from disk.

pub mod global_bindings;
pub mod loader;
pub mod material;
pub mod texture_resource;

pub use global_bindings::{GlobalLayouts, ObjectUniform, SpotLight, ViewUniform};
pub use loader::{ResourceId, ResourceLoader, ShaderSource};
pub use material::Material;
pub use texture_resource::{TextureResource, TextureRole};
