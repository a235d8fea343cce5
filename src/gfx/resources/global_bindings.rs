//! Uniform bindings shared by the mesh pipelines
//!
//! Group 0 carries per-eye camera and light data, group 1 per-object transform and
//! shading parameters. Struct layouts MUST match the WGSL declarations in the
//! surface and phong shaders.

use cgmath::{InnerSpace, Vector3};

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    uniform_buffer::UniformBuffer,
};

/// Camera and light data for one eye of one view
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye_position: [f32; 4],
    pub light_position: [f32; 4],
    /// Normalized spot direction, cosine of the cutoff angle in `w`
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
}

/// Per-object transform and shading parameters
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// x: height scale, y: height correction, z: shininess
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 4], shininess: f32) -> Self {
        Self {
            model,
            color,
            params: [0.0, 0.0, shininess, 0.0],
        }
    }

    pub fn with_height(mut self, height_scale: f32, height_correction: f32) -> Self {
        self.params[0] = height_scale;
        self.params[1] = height_correction;
        self
    }
}

/// Spot light illuminating the scene
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub cutoff_deg: f64,
    pub color: [f32; 3],
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vector3::new(3.5, 2.0, 8.0),
            direction: Vector3::new(-3.5, -2.0, -8.0),
            cutoff_deg: 20.0,
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl SpotLight {
    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    /// Position, direction and color as they appear in [`ViewUniform`]
    pub fn uniform_parts(&self) -> ([f32; 4], [f32; 4], [f32; 4]) {
        let dir = if self.direction.magnitude2() > 0.0 {
            self.direction.normalize()
        } else {
            -Vector3::unit_z()
        };
        let cos_cutoff = self.cutoff_deg.to_radians().cos();
        (
            [self.position.x as f32, self.position.y as f32, self.position.z as f32, 1.0],
            [dir.x as f32, dir.y as f32, dir.z as f32, cos_cutoff as f32],
            [self.color[0], self.color[1], self.color[2], 1.0],
        )
    }
}

/// Layouts for groups 0 and 1, created once and shared by all pipelines
pub struct GlobalLayouts {
    pub view: BindGroupLayoutWithDesc,
    pub object: BindGroupLayoutWithDesc,
}

impl GlobalLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            view: BindGroupLayoutBuilder::new()
                .uniform(wgpu::ShaderStages::VERTEX_FRAGMENT)
                .create(device, "View Bind Group Layout"),
            object: BindGroupLayoutBuilder::new()
                .uniform(wgpu::ShaderStages::VERTEX_FRAGMENT)
                .create(device, "Object Bind Group Layout"),
        }
    }
}

/// Uniform buffer plus the bind group that exposes it
pub struct UniformBinding<Content> {
    ubo: UniformBuffer<Content>,
    bind_group: wgpu::BindGroup,
}

impl<Content: bytemuck::Pod> UniformBinding<Content> {
    pub fn new(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        initial: &Content,
        label: &str,
    ) -> Self {
        let ubo = UniformBuffer::with_content(device, label, initial);
        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .create(device, label);
        Self { ubo, bind_group }
    }

    pub fn update(&mut self, queue: &wgpu::Queue, content: Content) {
        self.ubo.write(queue, content);
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

pub type ViewBinding = UniformBinding<ViewUniform>;
pub type ObjectBinding = UniformBinding<ObjectUniform>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<ViewUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ViewUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 96);
    }

    #[test]
    fn test_spot_light_parts() {
        let (position, direction, _) = SpotLight::default().uniform_parts();
        assert_eq!(position, [3.5, 2.0, 8.0, 1.0]);
        let len = (direction[0].powi(2) + direction[1].powi(2) + direction[2].powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert!((direction[3] - 20f32.to_radians().cos()).abs() < 1e-6);
    }

    #[test]
    fn test_height_params() {
        let uniform = ObjectUniform::new([[0.0; 4]; 4], [1.0; 4], 80.0).with_height(0.25, 0.125);
        assert_eq!(uniform.params, [0.25, 0.125, 80.0, 0.0]);
    }
}
