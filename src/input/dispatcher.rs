use log::debug;

use super::{InputEvent, Key, KeyAction};
use crate::gfx::camera::CameraStep;
use crate::gfx::rendering::view_panel::ViewLayout;
use crate::state::{DemoState, MouseState, HEIGHT_CORRECTION_STEP, HEIGHT_SCALE_STEP};

/// Window-level side effects the dispatcher cannot perform itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    /// Borderless fullscreen on the primary monitor, or back to the default windowed size
    SetFullscreen(bool),
}

/// Applies one input event to the application state
pub fn dispatch(state: &mut DemoState, event: InputEvent) -> Option<WindowCommand> {
    match event {
        InputEvent::Key { action: KeyAction::Release, .. } => None,
        InputEvent::Key { key, .. } => handle_key(state, key),
        InputEvent::MouseButton { pressed } => {
            state.mouse.state = if pressed {
                MouseState::Selecting
            } else {
                MouseState::Idle
            };
            None
        }
        InputEvent::CursorMoved { x, y } => {
            // a press before any motion has no anchor; this motion becomes it
            if let (MouseState::Selecting, Some((last_x, last_y))) =
                (state.mouse.state, state.mouse.cursor)
            {
                let controller = state.controller;
                controller.drag(&mut state.views[0], last_x - x, last_y - y);
            }
            state.mouse.cursor = Some((x, y));
            None
        }
        InputEvent::Resized { width, height } => {
            state.layout = ViewLayout::split(width, height);
            debug!("Window resized to {width}x{height}");
            None
        }
        InputEvent::CloseRequested => {
            state.close_requested = true;
            None
        }
    }
}

fn handle_key(state: &mut DemoState, key: Key) -> Option<WindowCommand> {
    let controller = state.controller;
    let camera = &mut state.views[0];

    match key {
        Key::Escape | Key::Q => state.close_requested = true,
        Key::F => {
            state.fullscreen = !state.fullscreen;
            return Some(WindowCommand::SetFullscreen(state.fullscreen));
        }
        Key::M => state.mirrored = !state.mirrored,
        Key::R => state.uniforms.adjust_height_scale(-HEIGHT_SCALE_STEP),
        Key::E => state.uniforms.adjust_height_scale(HEIGHT_SCALE_STEP),
        Key::T => state.uniforms.adjust_height_correction(-HEIGHT_CORRECTION_STEP),
        Key::Y => state.uniforms.adjust_height_correction(HEIGHT_CORRECTION_STEP),
        Key::W => controller.step(camera, CameraStep::XNegative),
        Key::S => controller.step(camera, CameraStep::XPositive),
        Key::A => controller.step(camera, CameraStep::YNegative),
        Key::D => controller.step(camera, CameraStep::YPositive),
        Key::Z => controller.step(camera, CameraStep::ZNegative),
        Key::X => controller.step(camera, CameraStep::ZPositive),
        Key::U => println!("{}", camera.pose_report()),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StereoMode;
    use crate::gfx::rendering::view_panel::PanelRect;
    use cgmath::{InnerSpace, Vector3};

    fn press(key: Key) -> InputEvent {
        InputEvent::Key { key, action: KeyAction::Press }
    }

    fn state() -> DemoState {
        DemoState::new(StereoMode::Disabled)
    }

    #[test]
    fn test_displacement_increments_then_decrements() {
        for (n, m) in [(10u32, 3u32), (3, 10), (0, 5), (2000, 0), (1500, 1499)] {
            let mut s = state();
            for _ in 0..n {
                dispatch(&mut s, press(Key::E));
            }
            for _ in 0..m {
                dispatch(&mut s, press(Key::R));
            }
            let expected = (0.0005 * (n as f64 - m as f64)).clamp(0.0, 1.0);
            assert!(
                (s.uniforms.height_scale - expected).abs() < 1e-9,
                "n={n} m={m}: {} vs {expected}",
                s.uniforms.height_scale
            );
            assert!((0.0..=1.0).contains(&s.uniforms.height_scale));
        }
    }

    #[test]
    fn test_clamp_applies_per_press() {
        let mut s = state();
        for _ in 0..5 {
            dispatch(&mut s, press(Key::R));
        }
        for _ in 0..10 {
            dispatch(&mut s, press(Key::E));
        }
        // decrements at zero are lost, so this is 10 steps up, not 5
        assert!((s.uniforms.height_scale - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_scale_keys_rederive_correction() {
        let mut s = state();
        dispatch(&mut s, press(Key::Y));
        dispatch(&mut s, press(Key::E));
        let expected = 0.45977 * s.uniforms.height_scale + 0.01;
        assert!((s.uniforms.height_correction - expected).abs() < 1e-12);

        dispatch(&mut s, press(Key::R));
        assert!((s.uniforms.height_correction - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_correction_keys_step_without_clamping() {
        let mut s = state();
        let start = s.uniforms.height_correction;
        dispatch(&mut s, press(Key::T));
        dispatch(&mut s, press(Key::T));
        dispatch(&mut s, press(Key::T));
        assert!((s.uniforms.height_correction - (start - 0.015)).abs() < 1e-12);
        assert!(s.uniforms.height_correction < 0.0);

        dispatch(&mut s, press(Key::Y));
        assert!((s.uniforms.height_correction - (start - 0.010)).abs() < 1e-12);
    }

    #[test]
    fn test_release_is_ignored_and_repeat_counts() {
        let mut s = state();
        dispatch(&mut s, InputEvent::Key { key: Key::E, action: KeyAction::Release });
        assert_eq!(s.uniforms.height_scale, 0.0);
        dispatch(&mut s, InputEvent::Key { key: Key::E, action: KeyAction::Repeat });
        assert!((s.uniforms.height_scale - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn test_close_and_toggles() {
        let mut s = state();
        assert_eq!(dispatch(&mut s, press(Key::F)), Some(WindowCommand::SetFullscreen(true)));
        assert_eq!(dispatch(&mut s, press(Key::F)), Some(WindowCommand::SetFullscreen(false)));
        dispatch(&mut s, press(Key::M));
        assert!(s.mirrored);
        assert!(!s.close_requested);
        dispatch(&mut s, press(Key::Q));
        assert!(s.close_requested);

        let mut s = state();
        dispatch(&mut s, InputEvent::CloseRequested);
        assert!(s.close_requested);
    }

    #[test]
    fn test_fullscreen_toggle_follows_window_state() {
        let mut s = state();
        dispatch(&mut s, press(Key::F));
        // window left fullscreen without a key press
        s.fullscreen = false;
        assert_eq!(dispatch(&mut s, press(Key::F)), Some(WindowCommand::SetFullscreen(true)));
    }

    #[test]
    fn test_camera_keys_move_view_one_only() {
        let mut s = state();
        let start = s.views[0].position();
        let other = s.views[1].clone();
        for key in [Key::W, Key::W, Key::D, Key::X] {
            dispatch(&mut s, press(key));
        }
        let moved = s.views[0].position() - start;
        assert!((moved - Vector3::new(-0.02, 0.01, 0.01)).magnitude() < 1e-12);
        assert_eq!(s.views[1], other);
    }

    #[test]
    fn test_drag_rotates_only_while_selecting() {
        let mut s = state();
        let look = s.views[0].look();
        dispatch(&mut s, InputEvent::CursorMoved { x: 100.0, y: 100.0 });
        dispatch(&mut s, InputEvent::CursorMoved { x: 300.0, y: 100.0 });
        assert_eq!(s.views[0].look(), look);

        dispatch(&mut s, InputEvent::MouseButton { pressed: true });
        dispatch(&mut s, InputEvent::CursorMoved { x: 200.0, y: 100.0 });
        assert_eq!(s.mouse.cursor, Some((200.0, 100.0)));
        assert!((s.views[0].look() - look).magnitude() > 1e-6);

        dispatch(&mut s, InputEvent::MouseButton { pressed: false });
        assert_eq!(s.mouse.state, MouseState::Idle);
    }

    #[test]
    fn test_press_before_motion_does_not_jump() {
        let mut s = state();
        let look = s.views[0].look();
        dispatch(&mut s, InputEvent::MouseButton { pressed: true });
        assert_eq!(s.mouse.state, MouseState::Selecting);

        dispatch(&mut s, InputEvent::CursorMoved { x: 640.0, y: 360.0 });
        assert_eq!(s.views[0].look(), look);
        assert_eq!(s.mouse.cursor, Some((640.0, 360.0)));

        dispatch(&mut s, InputEvent::CursorMoved { x: 630.0, y: 360.0 });
        assert!((s.views[0].look() - look).magnitude() > 1e-9);
    }

    #[test]
    fn test_resize_splits_panels() {
        let mut s = state();
        dispatch(&mut s, InputEvent::Resized { width: 1281, height: 720 });
        assert_eq!(s.layout.panels[0], PanelRect { x: 0, y: 0, width: 640, height: 720 });
        assert_eq!(s.layout.panels[1], PanelRect { x: 640, y: 0, width: 640, height: 720 });
        assert_eq!(s.layout.framebuffer_size, (640, 720));
    }
}
