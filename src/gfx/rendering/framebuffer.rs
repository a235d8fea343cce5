//! Off-screen framebuffers, one per camera view
//!
//! Each framebuffer owns a color target, a depth buffer and one view binding per
//! eye. In passive stereo modes both eyes share the framebuffer, each drawn into
//! its own half.

use log::debug;

use crate::config::StereoMode;
use crate::gfx::{
    camera::{
        camera_utils::convert_matrix4_to_array,
        view_camera::{Eye, ViewCamera},
    },
    resources::{
        global_bindings::{GlobalLayouts, SpotLight, ViewBinding, ViewUniform},
        texture_resource::TextureResource,
    },
    scene::scene::DemoScene,
};

use super::pipeline_manager::PipelineManager;

pub const BACKGROUND_PIPELINE: &str = "Background";

/// Viewport in framebuffer pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Eye viewports covering a `width` x `height` framebuffer
pub fn eye_viewports(stereo: StereoMode, width: u32, height: u32) -> Vec<(Eye, Viewport)> {
    let viewport = |x: u32, y: u32, w: u32, h: u32| Viewport {
        x: x as f32,
        y: y as f32,
        width: w as f32,
        height: h as f32,
    };

    match stereo {
        StereoMode::Disabled => vec![(Eye::Mono, viewport(0, 0, width, height))],
        StereoMode::PassiveLeftRight => {
            let half = width / 2;
            vec![
                (Eye::Left, viewport(0, 0, half, height)),
                (Eye::Right, viewport(half, 0, width - half, height)),
            ]
        }
        StereoMode::PassiveTopBottom => {
            let half = height / 2;
            vec![
                (Eye::Left, viewport(0, 0, width, half)),
                (Eye::Right, viewport(0, half, width, height - half)),
            ]
        }
    }
}

/// Camera and light data for one eye
pub fn view_uniform(camera: &ViewCamera, eye: Eye, aspect: f32, light: &SpotLight) -> ViewUniform {
    let (light_position, light_direction, light_color) = light.uniform_parts();
    ViewUniform {
        view_proj: convert_matrix4_to_array(camera.view_projection(eye, aspect)),
        eye_position: camera.eye_position(eye),
        light_position,
        light_direction,
        light_color,
    }
}

struct EyeTarget {
    eye: Eye,
    viewport: Viewport,
    binding: ViewBinding,
}

pub struct Framebuffer {
    label: String,
    stereo: StereoMode,
    size: (u32, u32),
    color: TextureResource,
    depth: TextureResource,
    eyes: Vec<EyeTarget>,
}

impl Framebuffer {
    pub fn new(
        device: &wgpu::Device,
        layouts: &GlobalLayouts,
        stereo: StereoMode,
        size: (u32, u32),
        label: &str,
    ) -> Self {
        let size = (size.0.max(1), size.1.max(1));
        let eyes = eye_viewports(stereo, size.0, size.1)
            .into_iter()
            .map(|(eye, viewport)| EyeTarget {
                eye,
                viewport,
                binding: ViewBinding::new(
                    device,
                    &layouts.view,
                    &bytemuck::Zeroable::zeroed(),
                    &format!("{label} {eye:?} View Bind Group"),
                ),
            })
            .collect();

        Self {
            label: label.to_string(),
            stereo,
            size,
            color: TextureResource::create_render_target(device, size.0, size.1, &format!("{label} Color")),
            depth: TextureResource::create_depth_texture(device, size.0, size.1, &format!("{label} Depth")),
            eyes,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn color(&self) -> &TextureResource {
        &self.color
    }

    /// Recreates the attachments; returns `true` when the size actually changed
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        let size = (size.0.max(1), size.1.max(1));
        if size == self.size {
            return false;
        }
        debug!("Resizing {} to {}x{}", self.label, size.0, size.1);

        self.size = size;
        self.color =
            TextureResource::create_render_target(device, size.0, size.1, &format!("{} Color", self.label));
        self.depth =
            TextureResource::create_depth_texture(device, size.0, size.1, &format!("{} Depth", self.label));
        for (target, (_, viewport)) in self
            .eyes
            .iter_mut()
            .zip(eye_viewports(self.stereo, size.0, size.1))
        {
            target.viewport = viewport;
        }
        true
    }

    /// Uploads camera and light data for every eye
    pub fn update_view(&mut self, queue: &wgpu::Queue, camera: &ViewCamera, light: &SpotLight) {
        for target in self.eyes.iter_mut() {
            let uniform = view_uniform(camera, target.eye, target.viewport.aspect(), light);
            target.binding.update(queue, uniform);
        }
    }

    /// Renders background and scene into this framebuffer
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &PipelineManager,
        scene: &DemoScene,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        for target in &self.eyes {
            let v = target.viewport;
            if v.width < 1.0 || v.height < 1.0 {
                continue;
            }
            render_pass.set_viewport(v.x, v.y, v.width, v.height, 0.0, 1.0);
            render_pass.set_bind_group(0, target.binding.bind_group(), &[]);

            if let Some(background) = pipelines.pipeline(BACKGROUND_PIPELINE) {
                render_pass.set_pipeline(background);
                render_pass.draw(0..3, 0..1);
            }

            scene.draw(&mut render_pass, pipelines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn test_mono_viewport_covers_framebuffer() {
        let viewports = eye_viewports(StereoMode::Disabled, 640, 720);
        assert_eq!(viewports.len(), 1);
        assert_eq!(viewports[0].0, Eye::Mono);
        assert_eq!(
            viewports[0].1,
            Viewport { x: 0.0, y: 0.0, width: 640.0, height: 720.0 }
        );
    }

    #[test]
    fn test_left_right_split() {
        let viewports = eye_viewports(StereoMode::PassiveLeftRight, 641, 720);
        assert_eq!(viewports[0].0, Eye::Left);
        assert_eq!(viewports[0].1.width, 320.0);
        assert_eq!(viewports[1].0, Eye::Right);
        assert_eq!(viewports[1].1.x, 320.0);
        assert_eq!(viewports[1].1.width, 321.0);
    }

    #[test]
    fn test_top_bottom_split() {
        let viewports = eye_viewports(StereoMode::PassiveTopBottom, 640, 720);
        assert_eq!(viewports[0].1.height, 360.0);
        assert_eq!(viewports[1].1.y, 360.0);
        assert_eq!(viewports[1].1.width, 640.0);
    }

    #[test]
    fn test_view_uniform_carries_light() {
        let camera = ViewCamera::new(
            Vector3::new(1.5, 0.0, -0.27),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::unit_z(),
        );
        let uniform = view_uniform(&camera, Eye::Mono, 1.0, &SpotLight::default());
        assert_eq!(uniform.light_position, [3.5, 2.0, 8.0, 1.0]);
        assert!((uniform.eye_position[0] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_viewport_aspect() {
        let v = Viewport { x: 0.0, y: 0.0, width: 10.0, height: 0.0 };
        assert_eq!(v.aspect(), 1.0);
    }
}
