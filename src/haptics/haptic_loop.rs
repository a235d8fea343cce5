//! Haptic loop thread
//!
//! The loop runs on a dedicated `haptics` thread and owns the tool (and through it
//! the device) for its whole lifetime. The graphics thread only sees:
//!
//! - the [`LoopControl`] state machine, to request a stop and wait for it,
//! - a [`FrequencyReader`] for the loop rate,
//! - the latest [`ToolState`] through a triple buffer.
//!
//! State transitions have a single owner per edge: the haptic thread moves
//! `Idle -> Running` and `* -> Stopped`, everyone else may only request a stop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, trace, warn};
use parking_lot::{Condvar, Mutex};
use triple_buffer::{Input, Output, TripleBuffer};

use super::{contact::PlaneContact, tool::ToolCursor, tool::ToolState, HapticError};
use crate::gfx::scene::graph::{NodeId, SceneGraph};
use crate::performance::{FrequencyCounter, FrequencyReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoopState {
    Idle = 0,
    Running = 1,
    StopRequested = 2,
    Stopped = 3,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoopState::Idle,
            1 => LoopState::Running,
            2 => LoopState::StopRequested,
            _ => LoopState::Stopped,
        }
    }
}

/// Shared haptic loop state with a blocking wait on `Stopped`
#[derive(Debug)]
pub struct LoopControl {
    state: AtomicU8,
    lock: Mutex<()>,
    stopped: Condvar,
}

impl LoopControl {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LoopState::Idle as u8),
            lock: Mutex::new(()),
            stopped: Condvar::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    /// `Idle -> Running`; false if a stop was requested first
    pub fn begin(&self) -> bool {
        self.state
            .compare_exchange(
                LoopState::Idle as u8,
                LoopState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Asks the loop to finish its current iteration and stop
    pub fn request_stop(&self) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match LoopState::from_u8(current) {
                    LoopState::Stopped => None,
                    _ => Some(LoopState::StopRequested as u8),
                }
            });
    }

    /// Publishes `Stopped` and wakes every waiter
    pub fn mark_stopped(&self) {
        let _guard = self.lock.lock();
        self.state.store(LoopState::Stopped as u8, Ordering::Release);
        self.stopped.notify_all();
    }

    /// Blocks until `Stopped` or until `timeout` elapses; returns whether it stopped
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.lock.lock();
        while self.state() != LoopState::Stopped {
            if self.stopped.wait_until(&mut guard, deadline).timed_out() {
                return self.state() == LoopState::Stopped;
            }
        }
        true
    }
}

impl Default for LoopControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Pacing for the loop thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    /// `None` free-runs
    pub rate_limit_hz: Option<u32>,
}

/// Everything the haptic thread computes against
pub struct HapticWorld {
    graph: SceneGraph,
    plane: NodeId,
    tool_node: NodeId,
    contact: PlaneContact,
    tool: ToolCursor,
    tick: u64,
}

impl HapticWorld {
    /// `graph` is the haptic thread's own copy of the scene
    pub fn new(
        graph: SceneGraph,
        plane: NodeId,
        tool_node: NodeId,
        contact: PlaneContact,
        tool: ToolCursor,
    ) -> Self {
        Self {
            graph,
            plane,
            tool_node,
            contact,
            tool,
            tick: 0,
        }
    }

    /// One haptic update: transforms, device read, contact, force write
    pub fn step(&mut self, last_interval: Duration) -> Result<ToolState, HapticError> {
        self.graph.compute_global_positions();

        let parent = self.graph.parent_global(self.tool_node);
        self.tool.update_from_device(&parent)?;

        let plane_pose = self.graph.global(self.plane);
        let device = self.tool.device_global_position();
        let contact = self.contact.compute(&plane_pose, device, self.tool.radius());
        self.tool.set_contact(contact.proxy, contact.force);

        self.tool.apply_force()?;

        self.tick += 1;
        Ok(ToolState {
            tick: self.tick,
            device_position: device.into(),
            proxy_position: contact.proxy.into(),
            force: contact.force.into(),
            in_contact: contact.in_contact,
            last_interval,
        })
    }

    pub fn tool(&self) -> &ToolCursor {
        &self.tool
    }

    pub fn into_tool(self) -> ToolCursor {
        self.tool
    }
}

/// Handle to the running haptic thread
pub struct HapticLoop {
    control: Arc<LoopControl>,
    handle: Option<JoinHandle<ToolCursor>>,
    snapshots: Output<ToolState>,
    frequency: FrequencyReader,
}

impl HapticLoop {
    /// Starts the `haptics` thread
    pub fn spawn(world: HapticWorld, settings: LoopSettings) -> std::io::Result<Self> {
        let control = Arc::new(LoopControl::new());
        let counter = FrequencyCounter::new();
        let frequency = counter.reader();
        let (input, snapshots) = TripleBuffer::new(&ToolState::default()).split();

        let thread_control = Arc::clone(&control);
        let handle = thread::Builder::new()
            .name("haptics".to_string())
            .spawn(move || run(world, thread_control, counter, input, settings))?;

        Ok(Self {
            control,
            handle: Some(handle),
            snapshots,
            frequency,
        })
    }

    pub fn control(&self) -> &Arc<LoopControl> {
        &self.control
    }

    pub fn state(&self) -> LoopState {
        self.control.state()
    }

    /// Loop rate in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency.frequency()
    }

    /// Most recent tool snapshot
    pub fn latest(&mut self) -> &ToolState {
        self.snapshots.read()
    }

    pub fn request_stop(&self) {
        self.control.request_stop();
    }

    /// Waits for `Stopped`, logging every `poll_interval`, for at most `timeout`
    pub fn wait_stopped(&self, timeout: Duration, poll_interval: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return self.control.state() == LoopState::Stopped;
            }
            if self.control.wait_stopped(poll_interval.min(deadline - now)) {
                return true;
            }
            info!("Waiting for haptic loop to stop ({:?})", self.control.state());
        }
    }

    /// Joins the thread and returns the tool it owned
    ///
    /// Must only be called once `Stopped` has been observed.
    pub fn join(mut self) -> Option<ToolCursor> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(tool) => Some(tool),
            Err(_) => {
                error!("Haptic thread panicked");
                None
            }
        }
    }
}

impl Drop for HapticLoop {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.control.request_stop();
        }
    }
}

fn run(
    mut world: HapticWorld,
    control: Arc<LoopControl>,
    mut counter: FrequencyCounter,
    mut snapshots: Input<ToolState>,
    settings: LoopSettings,
) -> ToolCursor {
    if control.begin() {
        info!("Haptic loop running");
        let period = settings
            .rate_limit_hz
            .map(|hz| Duration::from_secs_f64(1.0 / f64::from(hz.max(1))));
        let mut clock = Instant::now();
        let mut next_tick = clock;

        while control.is_running() {
            let now = Instant::now();
            let interval = now.duration_since(clock);
            clock = now;

            counter.signal(1);

            match world.step(interval) {
                Ok(state) => {
                    trace!("haptic tick {} force {:?}", state.tick, state.force);
                    snapshots.write(state);
                }
                Err(e) => {
                    error!("Haptic device error, stopping haptic loop: {e}");
                    world.tool.release_force();
                    break;
                }
            }

            if let Some(period) = period {
                next_tick += period;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                } else if now - next_tick > period {
                    // fell behind, don't try to catch up
                    next_tick = now;
                }
            }
        }
        debug!("Haptic loop left after {} ticks", world.tick);
    } else {
        warn!("Haptic loop stopped before it started");
    }

    control.mark_stopped();
    world.into_tool()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_stop_transitions() {
        let control = LoopControl::new();
        assert_eq!(control.state(), LoopState::Idle);
        assert!(control.begin());
        assert!(control.is_running());
        assert!(!control.begin());

        control.request_stop();
        assert_eq!(control.state(), LoopState::StopRequested);
        assert!(!control.is_running());

        control.mark_stopped();
        control.request_stop();
        assert_eq!(control.state(), LoopState::Stopped);
    }

    #[test]
    fn test_stop_before_start_prevents_running() {
        let control = LoopControl::new();
        control.request_stop();
        assert!(!control.begin());
    }

    #[test]
    fn test_wait_stopped_times_out() {
        let control = LoopControl::new();
        assert!(control.begin());
        assert!(!control.wait_stopped(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_stopped_wakes_on_mark() {
        let control = Arc::new(LoopControl::new());
        let remote = Arc::clone(&control);
        let waiter = thread::spawn(move || remote.wait_stopped(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(10));
        control.mark_stopped();
        assert!(waiter.join().unwrap());
    }
}
