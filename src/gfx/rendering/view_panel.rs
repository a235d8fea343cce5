//! On-screen panels showing the off-screen view framebuffers
//!
//! The window is split vertically into two panels of equal width. Each panel draws
//! its framebuffer's color texture as a full-viewport triangle, optionally mirrored
//! vertically.

use crate::gfx::resources::texture_resource::TextureResource;
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    uniform_buffer::UniformBuffer,
};

/// Pixel rectangle inside the window, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PanelRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Placement of both panels and the size shared by both framebuffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewLayout {
    pub panels: [PanelRect; 2],
    pub framebuffer_size: (u32, u32),
}

impl ViewLayout {
    /// Side-by-side split of a `width` x `height` window
    pub fn split(width: u32, height: u32) -> Self {
        let half = width / 2;
        Self {
            panels: [
                PanelRect {
                    x: 0,
                    y: 0,
                    width: half,
                    height,
                },
                PanelRect {
                    x: half,
                    y: 0,
                    width: half,
                    height,
                },
            ],
            framebuffer_size: (half, height),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PanelUniform {
    /// 1.0 flips the image vertically
    pub mirror: f32,
    _padding: [f32; 3],
}

impl PanelUniform {
    pub fn new(mirrored: bool) -> Self {
        Self {
            mirror: if mirrored { 1.0 } else { 0.0 },
            _padding: [0.0; 3],
        }
    }
}

pub fn panel_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .texture_2d()
        .filtering_sampler()
        .uniform(wgpu::ShaderStages::VERTEX)
        .create(device, "Panel Bind Group Layout")
}

pub struct ViewPanel {
    pub rect: PanelRect,
    uniform: UniformBuffer<PanelUniform>,
    bind_group: wgpu::BindGroup,
}

impl ViewPanel {
    pub fn new(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        source: &TextureResource,
        rect: PanelRect,
    ) -> Self {
        let uniform = UniformBuffer::with_content(device, "Panel Uniform", &PanelUniform::new(false));
        let bind_group = Self::create_bind_group(device, layout, source, &uniform);
        Self {
            rect,
            uniform,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        source: &TextureResource,
        uniform: &UniformBuffer<PanelUniform>,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .texture(&source.view)
            .sampler(&source.sampler)
            .resource(uniform.binding_resource())
            .create(device, "Panel Bind Group")
    }

    /// Re-binds the panel after its framebuffer was recreated
    pub fn rebind(
        &mut self,
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        source: &TextureResource,
        rect: PanelRect,
    ) {
        self.rect = rect;
        self.bind_group = Self::create_bind_group(device, layout, source, &self.uniform);
    }

    pub fn set_mirrored(&mut self, queue: &wgpu::Queue, mirrored: bool) {
        self.uniform.write(queue, PanelUniform::new(mirrored));
    }

    /// Draws the panel clipped to its rectangle; the pipeline must already be set
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, surface_size: (u32, u32)) {
        let rect = clip_to_surface(self.rect, surface_size);
        if rect.is_empty() {
            return;
        }
        render_pass.set_viewport(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
            0.0,
            1.0,
        );
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

/// Viewports must lie inside the render target
pub fn clip_to_surface(rect: PanelRect, (width, height): (u32, u32)) -> PanelRect {
    let x = rect.x.min(width);
    let y = rect.y.min(height);
    PanelRect {
        x,
        y,
        width: rect.width.min(width - x),
        height: rect.height.min(height - y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_even_width() {
        let layout = ViewLayout::split(1280, 720);
        assert_eq!(
            layout.panels,
            [
                PanelRect { x: 0, y: 0, width: 640, height: 720 },
                PanelRect { x: 640, y: 0, width: 640, height: 720 },
            ]
        );
        assert_eq!(layout.framebuffer_size, (640, 720));
    }

    #[test]
    fn test_split_odd_width_uses_integer_division() {
        let layout = ViewLayout::split(1001, 3);
        assert_eq!(layout.panels[1].x, 500);
        assert_eq!(layout.framebuffer_size, (500, 3));
    }

    #[test]
    fn test_split_minimized_window() {
        let layout = ViewLayout::split(0, 0);
        assert!(layout.panels.iter().all(PanelRect::is_empty));
    }

    #[test]
    fn test_clip_to_surface() {
        let rect = PanelRect { x: 640, y: 0, width: 640, height: 720 };
        assert_eq!(clip_to_surface(rect, (1280, 720)), rect);
        assert_eq!(
            clip_to_surface(rect, (1000, 500)),
            PanelRect { x: 640, y: 0, width: 360, height: 500 }
        );
        assert!(clip_to_surface(rect, (600, 500)).is_empty());
    }

    #[test]
    fn test_mirror_uniform() {
        assert_eq!(PanelUniform::new(true).mirror, 1.0);
        assert_eq!(PanelUniform::new(false).mirror, 0.0);
        assert_eq!(std::mem::size_of::<PanelUniform>(), 16);
    }
}
