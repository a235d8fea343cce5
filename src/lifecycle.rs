//! Startup, per-frame work and shutdown of a demo session
//!
//! [`Session::start`] brings the subsystems up in dependency order, [`Session::frame`]
//! runs one graphics iteration and [`Session::shutdown`] tears everything down in
//! reverse, stopping the haptic thread before the device it drives.

use std::sync::Arc;

use log::{debug, error, info, warn};
use winit::window::{Fullscreen, Window};

use crate::config::{AppConfig, HapticsConfig};
use crate::error::AppError;
use crate::gfx::{
    rendering::{FrameOutcome, Framebuffer, RenderEngine, ViewLayout, ViewPanel},
    resources::{
        loader::{ResourceId, ResourceLoader},
        material::Material,
        texture_resource::{TextureResource, TextureRole},
        SpotLight,
    },
    scene::{build_scene_graph, place_light, scene::PLANE_SIZE, DemoScene, SceneGraph, SceneNodes},
};
use crate::haptics::{
    DeviceHandler, HapticDevice, HapticLoop, HapticWorld, LoopSettings, NullDevice, PlaneContact,
    ToolCursor,
};
use crate::input::{dispatch, InputEvent, InputQueue, WindowCommand};
use crate::performance::FrequencyCounter;
use crate::state::DemoState;
use crate::ui::{draw_rate_labels, rate_label, UiManager};

/// Plane contact stiffness as a fraction of the tool's maximum stiffness
pub const CONTACT_STIFFNESS_RATIO: f64 = 0.5;

/// Takes the first device from `handler`, or the null device when none is connected
///
/// Fails with [`AppError::MissingHapticDevice`] when `config.require_device` is set
/// and nothing was found.
pub fn acquire_device(
    handler: &mut DeviceHandler,
    config: &HapticsConfig,
) -> Result<Box<dyn HapticDevice>, AppError> {
    match handler.get_device(0) {
        Ok(device) => Ok(device),
        Err(err) if config.require_device => {
            error!("No haptic device available: {err}");
            Err(AppError::MissingHapticDevice)
        }
        Err(err) => {
            warn!("No haptic device available ({err}); using the null device");
            Ok(Box::new(NullDevice::new()))
        }
    }
}

/// Attaches `device` to a started tool
pub fn attach_tool(device: Box<dyn HapticDevice>, config: &HapticsConfig) -> Result<ToolCursor, AppError> {
    let mut tool = ToolCursor::new(device, config.tool_radius, config.workspace_radius);
    tool.start()?;
    Ok(tool)
}

/// Builds the haptic thread's world from its own copy of the scene graph
pub fn haptic_world(graph: SceneGraph, nodes: &SceneNodes, tool: ToolCursor) -> HapticWorld {
    let contact = PlaneContact::new(
        PLANE_SIZE,
        PLANE_SIZE,
        CONTACT_STIFFNESS_RATIO * tool.max_stiffness(),
    );
    HapticWorld::new(graph, nodes.plane, nodes.tool, contact, tool)
}

/// Starts the `haptics` thread
pub fn spawn_haptics(world: HapticWorld, config: &HapticsConfig) -> Result<HapticLoop, AppError> {
    let settings = LoopSettings {
        rate_limit_hz: config.rate_limit_hz,
    };
    let haptics = HapticLoop::spawn(world, settings).map_err(AppError::ThreadSpawn)?;
    info!("Haptic thread started (rate limit {:?} Hz)", config.rate_limit_hz);
    Ok(haptics)
}

/// Stops the haptic thread, then the tool it was driving
///
/// The device is only touched again after the loop reported `Stopped`.
pub fn stop_haptics(haptics: HapticLoop, config: &HapticsConfig) -> Result<(), AppError> {
    haptics.request_stop();
    if !haptics.wait_stopped(config.shutdown_timeout, config.shutdown_poll_interval) {
        error!("Haptic loop did not stop within {:?}", config.shutdown_timeout);
        return Err(AppError::ShutdownTimeout(config.shutdown_timeout));
    }

    // the thread owns the tool until it returns; after Stopped it only hands it back
    if let Some(mut tool) = haptics.join() {
        if let Err(err) = tool.stop() {
            warn!("Failed to stop the haptic tool: {err}");
        }
    }
    info!("Haptics stopped");
    Ok(())
}

fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    loader: &ResourceLoader,
    id: ResourceId,
) -> Result<TextureResource, AppError> {
    let role = id.texture_role().unwrap_or(TextureRole::Color);
    Ok(match loader.load_image(id)? {
        Some(image) => TextureResource::from_image(device, queue, &image, id.label(), role),
        None => TextureResource::neutral(device, queue, id.label(), role),
    })
}

/// Reads and compiles one scene shader
///
/// A compile failure goes through the resource policy; optional shaders fall back
/// to the built-in source.
fn load_scene_shader(
    engine: &mut RenderEngine,
    loader: &ResourceLoader,
    id: ResourceId,
) -> Result<(), AppError> {
    let compile = |engine: &mut RenderEngine, source: &str| match id {
        ResourceId::SurfaceShader => engine.load_surface_shader(source),
        _ => engine.load_phong_shader(source),
    };

    let shader = loader.load_shader(id)?;
    let Err(reason) = compile(engine, &shader.source) else {
        debug!("Compiled {}", shader.name);
        return Ok(());
    };

    loader.on_failure(id, loader.path_of(id), reason)?;
    match id.embedded_shader(loader.shader_mode()) {
        Some(fallback) if !shader.embedded => {
            compile(engine, fallback).map_err(|reason| AppError::ResourceLoad {
                what: id.label(),
                path: loader.path_of(id),
                reason,
            })
        }
        _ => Ok(()),
    }
}

/// Everything alive between startup and shutdown
pub struct Session {
    config: AppConfig,
    window: Arc<Window>,
    engine: RenderEngine,
    ui: UiManager,
    pub state: DemoState,
    scene: DemoScene,
    framebuffers: [Framebuffer; 2],
    panels: [ViewPanel; 2],
    input: InputQueue,
    graphics_counter: FrequencyCounter,
    haptics: HapticLoop,
    device_handler: DeviceHandler,
}

impl Session {
    /// Brings every subsystem up on an already opened window
    pub fn start(config: AppConfig, window: Arc<Window>) -> Result<Self, AppError> {
        let size = window.inner_size();
        let mut engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            size.width,
            size.height,
            config.vsync,
        ))?;

        let mut state = DemoState::new(config.stereo);
        let (mut graph, nodes) = build_scene_graph();

        let light = SpotLight::default();
        place_light(&mut graph, &nodes, &light);

        let mut device_handler = DeviceHandler::new(config.haptics.device);
        let haptic_device = acquire_device(&mut device_handler, &config.haptics)?;
        let tool = attach_tool(haptic_device, &config.haptics)?;

        let root = config.resolve_resource_root();
        info!("Loading resources from {}", root.display());
        let device = engine.device();
        let loader = ResourceLoader::new(root, config.policies.clone(), config.shader_mode)
            .with_max_texture_dimension(device.limits().max_texture_dimension_2d);

        let queue = engine.queue();
        let color = load_texture(device, queue, &loader, ResourceId::ColorTexture)?;
        let displacement = load_texture(device, queue, &loader, ResourceId::DisplacementMap)?;
        let normal = load_texture(device, queue, &loader, ResourceId::NormalMap)?;
        let sphere = load_texture(device, queue, &loader, ResourceId::SphereTexture)?;

        let plane_material = Material::new(
            device,
            engine.material_layout(),
            "Plane",
            color,
            normal,
            displacement,
        );
        let marker_material =
            Material::color_only(device, queue, engine.material_layout(), "Marker", sphere);

        load_scene_shader(&mut engine, &loader, ResourceId::SurfaceShader)?;
        load_scene_shader(&mut engine, &loader, ResourceId::PhongShader)?;
        engine.create_pipelines()?;

        let haptic_graph = graph.clone();
        let mut scene = DemoScene::new(
            engine.device(),
            engine.global_layouts(),
            graph,
            nodes,
            light,
            plane_material,
            marker_material,
        );
        scene.update(engine.queue(), &state.uniforms);

        state.layout = ViewLayout::split(size.width, size.height);
        let framebuffers = [
            Framebuffer::new(
                engine.device(),
                engine.global_layouts(),
                config.stereo,
                state.layout.framebuffer_size,
                "View 1 Framebuffer",
            ),
            Framebuffer::new(
                engine.device(),
                engine.global_layouts(),
                config.stereo,
                state.layout.framebuffer_size,
                "View 2 Framebuffer",
            ),
        ];

        let panels = [0usize, 1].map(|i| {
            ViewPanel::new(
                engine.device(),
                engine.panel_layout(),
                framebuffers[i].color(),
                state.layout.panels[i],
            )
        });

        let mut ui = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );
        ui.update_display_size(size.width, size.height);

        let haptics = spawn_haptics(haptic_world(haptic_graph, &nodes, tool), &config.haptics)?;

        info!("Session started ({}x{})", size.width, size.height);
        Ok(Self {
            config,
            window,
            engine,
            ui,
            state,
            scene,
            framebuffers,
            panels,
            input: InputQueue::new(),
            graphics_counter: FrequencyCounter::new(),
            haptics,
            device_handler,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn should_close(&self) -> bool {
        self.state.close_requested
    }

    /// Queues input for the next frame
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Forwards a raw window event to the UI overlay
    pub fn ui_event(&mut self, event: &winit::event::Event<()>) {
        self.ui.handle_event(&self.window, event);
    }

    /// Runs one graphics iteration
    pub fn frame(&mut self) {
        let size = self.window.inner_size();
        self.engine.resize(size.width, size.height);
        self.ui.update_display_size(size.width, size.height);

        let label = rate_label(self.graphics_counter.frequency(), self.haptics.frequency());
        let label_panels = self.state.layout.panels;

        let light = self.scene.light_global();
        for (framebuffer, camera) in self.framebuffers.iter_mut().zip(self.state.views.iter()) {
            framebuffer.update_view(self.engine.queue(), camera, &light);
        }

        let ui = &mut self.ui;
        let window = &self.window;
        let draw_ui = |device: &wgpu::Device,
                       queue: &wgpu::Queue,
                       encoder: &mut wgpu::CommandEncoder,
                       view: &wgpu::TextureView| {
            ui.render(window, device, queue, encoder, view, |frame| {
                draw_rate_labels(frame, &label_panels, &label)
            });
        };
        let outcome = self.engine.render_frame(
            &self.scene,
            &self.framebuffers,
            &self.panels,
            Some(draw_ui),
        );
        if outcome == FrameOutcome::Skipped {
            debug!("Frame skipped");
        }

        self.process_input();

        let marker = self.haptics.latest().device_position;
        self.scene.set_marker_position(marker);
        self.scene.update(self.engine.queue(), &self.state.uniforms);

        self.graphics_counter.signal(1);
        debug!(
            "height_scale: {:.4}, height_correction: {:.4}",
            self.state.uniforms.height_scale, self.state.uniforms.height_correction
        );
    }

    fn process_input(&mut self) {
        let layout = self.state.layout;
        let mirrored = self.state.mirrored;
        // the window manager may leave fullscreen on its own
        self.state.fullscreen = self.window.fullscreen().is_some();

        let events: Vec<InputEvent> = self.input.drain().collect();
        for event in events {
            if let Some(command) = dispatch(&mut self.state, event) {
                self.apply_window_command(command);
            }
        }

        if self.state.layout != layout {
            self.apply_layout();
        }
        if self.state.mirrored != mirrored {
            for panel in self.panels.iter_mut() {
                panel.set_mirrored(self.engine.queue(), self.state.mirrored);
            }
        }
    }

    fn apply_layout(&mut self) {
        let layout = self.state.layout;
        for (i, panel) in self.panels.iter_mut().enumerate() {
            self.framebuffers[i].resize(self.engine.device(), layout.framebuffer_size);
            panel.rebind(
                self.engine.device(),
                self.engine.panel_layout(),
                self.framebuffers[i].color(),
                layout.panels[i],
            );
        }
    }

    fn apply_window_command(&self, command: WindowCommand) {
        match command {
            WindowCommand::SetFullscreen(true) => {
                let monitor = self.window.primary_monitor();
                self.window
                    .set_fullscreen(Some(Fullscreen::Borderless(monitor)));
            }
            WindowCommand::SetFullscreen(false) => {
                self.window.set_fullscreen(None);
                if let Some(monitor) = self.window.primary_monitor() {
                    let geometry = crate::app::WindowGeometry::centered_on(
                        monitor.position(),
                        monitor.size(),
                    );
                    if let Some(size) = self.window.request_inner_size(geometry.size) {
                        debug!("Window restored to {}x{}", size.width, size.height);
                    }
                    self.window.set_outer_position(geometry.position);
                }
            }
        }
    }

    /// Tears the session down in reverse dependency order
    pub fn shutdown(self) -> Result<(), AppError> {
        let Session {
            config,
            window,
            engine,
            ui,
            scene,
            framebuffers,
            panels,
            haptics,
            device_handler,
            ..
        } = self;

        drop(ui);
        drop(panels);
        drop(framebuffers);
        drop(engine);
        drop(window);

        let stopped = stop_haptics(haptics, &config.haptics);
        drop(scene);
        drop(device_handler);
        info!("Session shut down");
        stopped
    }
}
