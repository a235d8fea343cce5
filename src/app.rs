use std::sync::Arc;

use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::input::winit_bridge::translate_window_event;
use crate::lifecycle::Session;

/// Windowed placement: `0.8 * H` by `0.5 * H` for a monitor of height `H`, centered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub position: PhysicalPosition<i32>,
    pub size: PhysicalSize<u32>,
}

impl WindowGeometry {
    pub fn centered_on(monitor_position: PhysicalPosition<i32>, monitor_size: PhysicalSize<u32>) -> Self {
        let height = monitor_size.height as f64;
        let size = PhysicalSize::new((0.8 * height) as u32, (0.5 * height) as u32);
        let position = PhysicalPosition::new(
            monitor_position.x + (monitor_size.width as i32 - size.width as i32) / 2,
            monitor_position.y + (monitor_size.height as i32 - size.height as i32) / 2,
        );
        Self { position, size }
    }
}

pub struct BumpviewApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    session: Option<Session>,
    error: Option<AppError>,
}

impl BumpviewApp {
    /// Creates the event loop; the window and everything else is created on resume
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::new()?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                config,
                session: None,
                error: None,
            },
        })
    }

    /// Runs the demo until the window closes, then shuts the session down
    pub fn run(mut self) -> Result<(), AppError> {
        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self.app_state)?;

        let state = self.app_state;
        if let Some(err) = state.error {
            return Err(err);
        }
        match state.session {
            Some(session) => session.shutdown(),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn open_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, AppError> {
        let mut attributes = WindowAttributes::default().with_title(self.config.title.clone());
        if let Some(monitor) = event_loop.primary_monitor() {
            let geometry = WindowGeometry::centered_on(monitor.position(), monitor.size());
            attributes = attributes
                .with_inner_size(geometry.size)
                .with_position(geometry.position);
        }

        let window = event_loop.create_window(attributes)?;
        Ok(Arc::new(window))
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() || self.error.is_some() {
            return;
        }

        let started = self
            .open_window(event_loop)
            .and_then(|window| Session::start(self.config.clone(), window));

        match started {
            Ok(session) => {
                info!("Entering the graphics loop");
                self.session = Some(session);
            }
            Err(err) => {
                error!("Startup failed: {err}");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        session.ui_event(&ui_event);

        if let Some(input) = translate_window_event(&event) {
            session.push_input(input);
        }

        if let WindowEvent::RedrawRequested = event {
            session.frame();
            if session.should_close() {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_ref() {
            session.window().request_redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_geometry_from_monitor_height() {
        let geometry = WindowGeometry::centered_on(PhysicalPosition::new(0, 0), PhysicalSize::new(1920, 1080));
        assert_eq!(geometry.size, PhysicalSize::new(864, 540));
        assert_eq!(geometry.position, PhysicalPosition::new(528, 270));
    }

    #[test]
    fn test_window_geometry_offsets_secondary_monitor() {
        let geometry =
            WindowGeometry::centered_on(PhysicalPosition::new(1920, 0), PhysicalSize::new(2560, 1440));
        assert_eq!(geometry.size, PhysicalSize::new(1152, 720));
        assert_eq!(geometry.position.x, 1920 + 704);
    }
}
