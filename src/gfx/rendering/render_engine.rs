//! WGPU-based rendering engine
//!
//! Owns the surface, device and pipelines. A frame renders both view
//! framebuffers, composes them into their panels on screen, lets the UI overlay
//! draw on top, then waits for the GPU and checks the validation error scope
//! before presenting.

use std::sync::Arc;

use log::{error, info, warn};
use wgpu::TextureFormat;

use crate::error::AppError;
use crate::gfx::{
    resources::{
        global_bindings::GlobalLayouts, material::material_layout,
    },
    scene::scene::{DemoScene, PHONG_PIPELINE, SURFACE_PIPELINE},
};
use crate::wgpu_utils::BindGroupLayoutWithDesc;

use super::{
    framebuffer::{Framebuffer, BACKGROUND_PIPELINE},
    pipeline_manager::{DepthMode, PipelineConfig, PipelineManager},
    view_panel::{panel_layout, ViewPanel},
};

pub const PANEL_PIPELINE: &str = "Panel";

const SURFACE_SHADER: &str = "surface";
const PHONG_SHADER: &str = "phong";
const BACKGROUND_SHADER: &str = "background";
const PANEL_SHADER: &str = "panel";

/// Result of one call to [`RenderEngine::render_frame`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented,
    /// Presented, but the validation scope reported an error
    PresentedWithError(String),
    /// No surface texture was available; nothing was drawn
    Skipped,
}

/// Surface, device and pipelines shared by both views
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_layouts: GlobalLayouts,
    material_layout: BindGroupLayoutWithDesc,
    panel_layout: BindGroupLayoutWithDesc,
}

impl RenderEngine {
    /// Opens a device on an adapter compatible with `window` and configures the
    /// surface at `width` x `height`
    ///
    /// `vsync` selects FIFO presentation; otherwise frames are presented immediately.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, AppError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8Unorm);
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let global_layouts = GlobalLayouts::new(&device);
        let material_layout = material_layout(&device);
        let panel_layout = panel_layout(&device);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager
            .load_shader(BACKGROUND_SHADER, include_str!("background.wgsl"))
            .map_err(internal_shader_error)?;
        pipeline_manager
            .load_shader(PANEL_SHADER, include_str!("panel.wgsl"))
            .map_err(internal_shader_error)?;

        Ok(Self {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            format,
            pipeline_manager,
            global_layouts,
            material_layout,
            panel_layout,
        })
    }

    /// Compiles the surface shader; the error string names the compile failure
    pub fn load_surface_shader(&mut self, source: &str) -> Result<(), String> {
        self.pipeline_manager.load_shader(SURFACE_SHADER, source)
    }

    pub fn load_phong_shader(&mut self, source: &str) -> Result<(), String> {
        self.pipeline_manager.load_shader(PHONG_SHADER, source)
    }

    /// Registers and creates every pipeline a frame uses
    ///
    /// Both scene shaders must have been loaded first.
    pub fn create_pipelines(&mut self) -> Result<(), AppError> {
        let mesh_layouts = vec![
            self.global_layouts.view.layout.clone(),
            self.global_layouts.object.layout.clone(),
            self.material_layout.layout.clone(),
        ];

        self.pipeline_manager.register_pipeline(
            SURFACE_PIPELINE,
            PipelineConfig::default()
                .with_label("Surface Pipeline")
                .with_shader(SURFACE_SHADER)
                .with_bind_group_layouts(mesh_layouts.clone())
                .with_depth(DepthMode::Test)
                // the plane is one-sided but stays visible from below
                .with_cull_mode(None),
        );
        self.pipeline_manager.register_pipeline(
            PHONG_PIPELINE,
            PipelineConfig::default()
                .with_label("Phong Pipeline")
                .with_shader(PHONG_SHADER)
                .with_bind_group_layouts(mesh_layouts)
                .with_depth(DepthMode::Test),
        );
        self.pipeline_manager.register_pipeline(
            BACKGROUND_PIPELINE,
            PipelineConfig::default()
                .with_label("Background Pipeline")
                .with_shader(BACKGROUND_SHADER)
                .with_depth(DepthMode::Passthrough)
                .with_cull_mode(None)
                .with_generated_vertices(),
        );
        self.pipeline_manager.register_pipeline(
            PANEL_PIPELINE,
            PipelineConfig::default()
                .with_label("Panel Pipeline")
                .with_shader(PANEL_SHADER)
                .with_bind_group_layouts(vec![self.panel_layout.layout.clone()])
                .with_color_format(self.format)
                .with_cull_mode(None)
                .with_generated_vertices(),
        );

        self.pipeline_manager
            .create_all_pipelines()
            .map_err(|errors| AppError::ResourceLoad {
                what: "render pipelines",
                path: "shaders".into(),
                reason: errors.join("; "),
            })?;

        let stats = self.pipeline_manager.get_stats();
        info!(
            "Created {} pipelines from {} shaders",
            stats.total_pipelines, stats.loaded_shaders
        );
        Ok(())
    }

    /// Renders both views, composes them on screen and presents
    ///
    /// The UI callback records its own pass after the panels, on the same surface
    /// view. All submitted work is waited on before the error scope is checked.
    pub fn render_frame<F>(
        &mut self,
        scene: &DemoScene,
        framebuffers: &[Framebuffer; 2],
        panels: &[ViewPanel; 2],
        ui_callback: Option<F>,
    ) -> FrameOutcome
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return FrameOutcome::Skipped;
            }
            Err(err) => {
                warn!("Failed to acquire surface texture: {}", err);
                return FrameOutcome::Skipped;
            }
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        for framebuffer in framebuffers {
            framebuffer.render(&mut encoder, &self.pipeline_manager, scene);
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Panel Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.pipeline(PANEL_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                for panel in panels {
                    panel.draw(&mut render_pass, self.surface_size());
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        if let Err(err) = self.device.poll(wgpu::PollType::Wait) {
            warn!("Waiting for the GPU failed: {}", err);
        }

        let validation = pollster::block_on(self.device.pop_error_scope());
        surface_texture.present();

        match validation {
            Some(err) => {
                let message = err.to_string();
                error!("Rendering error: {}", message);
                FrameOutcome::PresentedWithError(message)
            }
            None => FrameOutcome::Presented,
        }
    }

    /// Reconfigures the surface; zero-sized (minimized) windows are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn global_layouts(&self) -> &GlobalLayouts {
        &self.global_layouts
    }

    pub fn material_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.material_layout
    }

    pub fn panel_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.panel_layout
    }
}

pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::Immediate
    }
}

fn internal_shader_error(reason: String) -> AppError {
    AppError::ResourceLoad {
        what: "built-in shader",
        path: "src/gfx/rendering".into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsync_uses_fifo() {
        assert_eq!(present_mode(true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false), wgpu::PresentMode::Immediate);
    }
}
