//! Textures, views and samplers
//!
//! GPU textures for material maps, off-screen render targets and depth buffers.

use image::RgbaImage;

/// How the texel data of a material map is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    /// Color data, sampled with sRGB decoding
    Color,
    /// Tangent-space normals packed into RGB
    Normal,
    /// Height data in the red channel
    Displacement,
}

impl TextureRole {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureRole::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureRole::Normal | TextureRole::Displacement => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Single texel that leaves shading unchanged when a map is missing
    pub fn neutral_texel(self) -> [u8; 4] {
        match self {
            TextureRole::Color => [255, 255, 255, 255],
            TextureRole::Normal => [128, 128, 255, 255],
            // mean height of the generated displacement map
            TextureRole::Displacement => [117, 117, 117, 255],
        }
    }
}

/// A texture with its default view and the sampler it is read with
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the renderer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Color format of the off-screen view framebuffers
    pub const RENDER_TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a depth texture of the given size
    pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Creates a color texture that can be rendered into and then sampled by a view panel
    pub fn create_render_target(device: &wgpu::Device, width: u32, height: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::RENDER_TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads tightly packed RGBA8 texels; `role` picks the sRGB or linear format
    #[allow(clippy::too_many_arguments)]
    pub fn create_from_rgba_data_with_filter(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
        role: TextureRole,
        filter_mode: wgpu::FilterMode,
    ) -> Self {
        let size = extent(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: role.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a decoded image with linear filtering
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
        role: TextureRole,
    ) -> Self {
        let (width, height) = image.dimensions();
        Self::create_from_rgba_data_with_filter(
            device,
            queue,
            image.as_raw(),
            width,
            height,
            label,
            role,
            wgpu::FilterMode::Linear,
        )
    }

    /// 1x1 stand-in for a map that failed to load
    pub fn neutral(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, role: TextureRole) -> Self {
        Self::create_from_rgba_data_with_filter(
            device,
            queue,
            &role.neutral_texel(),
            1,
            1,
            label,
            role,
            wgpu::FilterMode::Nearest,
        )
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_maps_are_linear() {
        assert!(TextureRole::Color.format().is_srgb());
        assert!(!TextureRole::Normal.format().is_srgb());
        assert!(!TextureRole::Displacement.format().is_srgb());
    }

    #[test]
    fn test_neutral_normal_points_out_of_surface() {
        let [r, g, b, _] = TextureRole::Normal.neutral_texel();
        let decode = |c: u8| c as f32 / 255.0 * 2.0 - 1.0;
        assert!(decode(r).abs() < 0.01);
        assert!(decode(g).abs() < 0.01);
        assert!(decode(b) > 0.99);
    }

    #[test]
    fn test_zero_extent_is_clamped() {
        let size = extent(0, 0);
        assert_eq!((size.width, size.height), (1, 1));
    }
}
