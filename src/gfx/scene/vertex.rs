//! # Mesh Vertex Format
//!
//! GPU vertex format shared by every mesh pipeline.

/// A 3D vertex carrying everything the surface shaders need for tangent-space
/// normal mapping.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the field order and packing that [`Vertex3D::desc`] describes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    /// Tangent along +u, bitangent handedness in `w`
    pub tangent: [f32; 4],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x4,
    ];

    /// Buffer layout matching the shader inputs
    ///
    /// - Location 0: position (Float32x3)
    /// - Location 1: normal (Float32x3)
    /// - Location 2: texture coordinates (Float32x2)
    /// - Location 3: tangent (Float32x4)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 48);
        assert_eq!(layout.attributes.len(), 4);
        assert_eq!(layout.attributes[3].offset, 32);
    }
}
