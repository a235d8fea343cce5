//! Named shaders and render pipelines
//!
//! Shaders are compiled as they are loaded; pipelines are registered by name and
//! created together once every shader they reference is available. Both steps run
//! inside a validation error scope, so a broken shader surfaces as an `Err` with
//! the compiler message instead of a device-lost panic.

use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::gfx::{resources::texture_resource::TextureResource, scene::vertex::Vertex3D};

/// How a pipeline uses the pass's depth attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthMode {
    /// Pass has no depth attachment
    None,
    /// Depth tested with `Less` and written
    Test,
    /// Attachment present but neither tested nor written, for backgrounds
    Passthrough,
}

/// Where vertex positions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInput {
    /// One [`Vertex3D`] buffer
    Mesh,
    /// Computed from `vertex_index` in the shader, e.g. fullscreen triangles
    Generated,
}

/// Configuration for creating a render pipeline
///
/// The shader must export `vs_main` and `fs_main`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pub cull_mode: Option<wgpu::Face>,
    pub depth: DepthMode,
    pub vertex_input: VertexInput,
    pub color_format: wgpu::TextureFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Pipeline".to_string(),
            shader: String::new(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(wgpu::Face::Back),
            depth: DepthMode::None,
            vertex_input: VertexInput::Mesh,
            color_format: TextureResource::RENDER_TARGET_FORMAT,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_owned();
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<wgpu::BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<wgpu::Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_depth(mut self, depth: DepthMode) -> Self {
        self.depth = depth;
        self
    }

    /// Renders to a target of `format` instead of a view framebuffer
    pub fn with_color_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_generated_vertices(mut self) -> Self {
        self.vertex_input = VertexInput::Generated;
        self
    }

    pub fn depth_stencil_state(&self) -> Option<wgpu::DepthStencilState> {
        let (depth_write_enabled, depth_compare) = match self.depth {
            DepthMode::None => return None,
            DepthMode::Test => (true, wgpu::CompareFunction::Less),
            DepthMode::Passthrough => (false, wgpu::CompareFunction::Always),
        };
        Some(wgpu::DepthStencilState {
            format: TextureResource::DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        })
    }
}

/// Runs `create` inside a validation error scope
fn validated<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let created = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(err.to_string()),
        None => Ok(created),
    }
}

pub struct PipelineManager {
    device: Arc<wgpu::Device>,
    shaders: HashMap<String, wgpu::ShaderModule>,
    configs: Vec<(String, PipelineConfig)>,
    pipelines: HashMap<String, wgpu::RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            configs: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles WGSL `source` under `name`; the error carries the compiler message
    pub fn load_shader(&mut self, name: &str, source: &str) -> Result<(), String> {
        let module = validated(&self.device, || {
            self.device
                .create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(name),
                    source: wgpu::ShaderSource::Wgsl(source.into()),
                })
        })
        .map_err(|err| format!("shader '{name}' failed to compile: {err}"))?;

        debug!("Compiled shader '{name}'");
        self.shaders.insert(name.to_string(), module);
        Ok(())
    }

    /// Registers (or replaces) a pipeline; it is built by the next [`Self::create_all_pipelines`]
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipelines.remove(name);
        match self.configs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = config,
            None => self.configs.push((name.to_string(), config)),
        }
    }

    /// Builds every registered pipeline that does not exist yet
    ///
    /// Failures are collected per pipeline; the others are still created.
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, config) in &self.configs {
            if self.pipelines.contains_key(name) {
                continue;
            }
            match self.create_pipeline(name, config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name.clone(), pipeline);
                }
                Err(err) => errors.push(format!("pipeline '{name}': {err}")),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Pipeline by name, once created
    pub fn pipeline(&self, name: &str) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(name)
    }

    fn create_pipeline(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<wgpu::RenderPipeline, String> {
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| format!("shader '{}' is not loaded", config.shader))?;

        let layouts: Vec<&wgpu::BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let vertex_buffers = match config.vertex_input {
            VertexInput::Mesh => vec![Vertex3D::desc()],
            VertexInput::Generated => Vec::new(),
        };
        let targets = [Some(wgpu::ColorTargetState {
            format: config.color_format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        validated(&self.device, || {
            let layout = self
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(&format!("{name} Layout")),
                    bind_group_layouts: &layouts,
                    push_constant_ranges: &[],
                });

            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&config.label),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: shader,
                        entry_point: Some("vs_main"),
                        buffers: &vertex_buffers,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: shader,
                        entry_point: Some("fs_main"),
                        targets: &targets,
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: config.cull_mode,
                        ..Default::default()
                    },
                    depth_stencil: config.depth_stencil_state(),
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
        })
    }

    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            registered_pipelines: self.configs.len(),
            loaded_shaders: self.shaders.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub registered_pipelines: usize,
    pub loaded_shaders: usize,
}
