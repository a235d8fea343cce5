//! # Generated Meshes
//!
//! The demo only needs two shapes, both generated in code: the bump-mapped plane
//! and the sphere marker that follows the haptic tool. Both carry tangents so the
//! normal map can be sampled in tangent space.
//!
//! ## Usage
//!
//! ```rust
//! use bumpview::gfx::geometry::{generate_plane, generate_sphere};
//!
//! let plane = generate_plane(0.9, 0.9);
//! let marker = generate_sphere(0.02, 32, 16);
//! assert_eq!(plane.triangle_count(), 2);
//! # assert!(marker.vertex_count() > 0);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Generated geometry ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Tangent with handedness in `w`
    pub tangents: Vec<[f32; 4]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves the attribute streams into the renderer's vertex format
    pub fn to_scene_format(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices = (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 0.0, 1.0]),
                tex_coords: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                tangent: self.tangents.get(i).copied().unwrap_or([1.0, 0.0, 0.0, 1.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
