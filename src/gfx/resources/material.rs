//! Texture sets bound to the surface and marker pipelines
//!
//! Both mesh pipelines share one material layout: color map, normal map,
//! displacement map and a filtering sampler. Meshes that do not use a map get the
//! neutral texture for it.

use crate::wgpu_utils::binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc};

use super::texture_resource::{TextureResource, TextureRole};

/// Layout of bind group 2 in the mesh pipelines
pub fn material_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .texture_2d()
        .texture_2d()
        .texture_2d()
        .filtering_sampler()
        .create(device, "Material Bind Group Layout")
}

pub struct Material {
    pub name: String,
    pub color_map: TextureResource,
    pub normal_map: TextureResource,
    pub displacement_map: TextureResource,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        name: &str,
        color_map: TextureResource,
        normal_map: TextureResource,
        displacement_map: TextureResource,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{name} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = BindGroupBuilder::new(layout)
            .texture(&color_map.view)
            .texture(&normal_map.view)
            .texture(&displacement_map.view)
            .sampler(&sampler)
            .create(device, &format!("{name} Material Bind Group"));

        Self {
            name: name.to_string(),
            color_map,
            normal_map,
            displacement_map,
            sampler,
            bind_group,
        }
    }

    /// Material with only a color map; the other slots hold neutral textures
    pub fn color_only(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        name: &str,
        color_map: TextureResource,
    ) -> Self {
        let normal_map = TextureResource::neutral(device, queue, &format!("{name} Normal"), TextureRole::Normal);
        let displacement_map = TextureResource::neutral(
            device,
            queue,
            &format!("{name} Displacement"),
            TextureRole::Displacement,
        );
        Self::new(device, layout, name, color_map, normal_map, displacement_map)
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
