//! # Input
//!
//! Window callbacks never touch application state directly. They are translated
//! into [`InputEvent`]s by [`winit_bridge`], pushed onto an [`InputQueue`], and
//! drained once per graphics frame through [`dispatcher::dispatch`].

pub mod dispatcher;
pub mod winit_bridge;

use std::collections::VecDeque;

pub use dispatcher::{dispatch, WindowCommand};

/// Keys the demo reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Q,
    F,
    M,
    R,
    E,
    T,
    Y,
    W,
    S,
    A,
    D,
    Z,
    X,
    U,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Repeat,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Key { key: Key, action: KeyAction },
    MouseButton { pressed: bool },
    CursorMoved { x: f64, y: f64 },
    Resized { width: u32, height: u32 },
    CloseRequested,
}

/// FIFO of pending input, filled by window callbacks
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and yields every pending event in arrival order
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::MouseButton { pressed: true });
        queue.push(InputEvent::CursorMoved { x: 1.0, y: 2.0 });
        queue.push(InputEvent::CloseRequested);
        assert_eq!(queue.len(), 3);

        let drained: Vec<InputEvent> = queue.drain().collect();
        assert_eq!(drained[0], InputEvent::MouseButton { pressed: true });
        assert_eq!(drained[2], InputEvent::CloseRequested);
        assert!(queue.is_empty());
    }
}
