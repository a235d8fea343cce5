//! # Loop Rate Measurement
//!
//! Events-per-second estimation for the graphics and haptic loops.
//!
//! A [`FrequencyCounter`] is owned and signalled by exactly one loop. It counts
//! signals inside a fixed measurement window and, when the window rolls over,
//! publishes `count / elapsed` through a lock-free [`FrequencyReader`] that any
//! other thread can poll.
//!
//! ## Usage
//!
//! ```rust
//! use bumpview::performance::FrequencyCounter;
//!
//! let mut counter = FrequencyCounter::new();
//! let reader = counter.reader();
//!
//! // In the loop
//! counter.signal(1);
//!
//! // Anywhere else
//! let hz = reader.frequency();
//! # assert_eq!(hz, 0.0);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default measurement window
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Windowed events-per-second counter
#[derive(Debug)]
pub struct FrequencyCounter {
    window: Duration,
    window_start: Option<Instant>,
    count: u64,
    frequency: Arc<AtomicU64>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Counter with a custom measurement window
    pub fn with_window(window: Duration) -> Self {
        Self {
            window: window.max(Duration::from_millis(1)),
            window_start: None,
            count: 0,
            frequency: Arc::new(AtomicU64::new(0.0f64.to_bits())),
        }
    }

    /// Handle for reading the latest published rate from another thread
    pub fn reader(&self) -> FrequencyReader {
        FrequencyReader {
            frequency: Arc::clone(&self.frequency),
        }
    }

    /// Records `n` events now
    pub fn signal(&mut self, n: u64) {
        self.signal_at(n, Instant::now());
    }

    /// Records `n` events at `now`
    ///
    /// The first call only opens the measurement window.
    pub fn signal_at(&mut self, n: u64, now: Instant) {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return;
        };

        self.count += n;

        let elapsed = now.saturating_duration_since(start);
        if elapsed >= self.window {
            let hz = self.count as f64 / elapsed.as_secs_f64();
            self.frequency.store(hz.to_bits(), Ordering::Release);
            self.window_start = Some(now);
            self.count = 0;
        }
    }

    /// Last published rate in Hz
    pub fn frequency(&self) -> f64 {
        f64::from_bits(self.frequency.load(Ordering::Acquire))
    }

    pub fn reset(&mut self) {
        self.window_start = None;
        self.count = 0;
        self.frequency.store(0.0f64.to_bits(), Ordering::Release);
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a [`FrequencyCounter`]
#[derive(Debug, Clone)]
pub struct FrequencyReader {
    frequency: Arc<AtomicU64>,
}

impl FrequencyReader {
    /// Last published rate in Hz
    pub fn frequency(&self) -> f64 {
        f64::from_bits(self.frequency.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Signals once every `period` for `total` and returns the published rate
    fn simulate(period: Duration, total: Duration) -> f64 {
        let mut counter = FrequencyCounter::new();
        let start = Instant::now();
        let mut t = Duration::ZERO;
        while t <= total {
            counter.signal_at(1, start + t);
            t += period;
        }
        counter.frequency()
    }

    #[test]
    fn test_reports_zero_before_first_window() {
        let mut counter = FrequencyCounter::new();
        let start = Instant::now();
        counter.signal_at(1, start);
        counter.signal_at(1, start + Duration::from_millis(500));
        assert_eq!(counter.frequency(), 0.0);
    }

    #[test]
    fn test_steady_rate() {
        let hz = simulate(Duration::from_millis(10), Duration::from_secs(3));
        assert!((hz - 100.0).abs() < 1e-6, "got {hz}");
    }

    #[test]
    fn test_bounded_by_actual_rate() {
        // 1 kHz signals, window boundary not aligned to the period
        let mut counter = FrequencyCounter::with_window(Duration::from_millis(1500));
        let start = Instant::now();
        for i in 0..=4000u64 {
            counter.signal_at(1, start + Duration::from_micros(i * 1000 + 700));
            assert!(counter.frequency() <= 1000.0 + 1e-9);
        }
        assert!(counter.frequency() > 990.0);
    }

    #[test]
    fn test_monotonic_in_signal_rate() {
        let total = Duration::from_secs(4);
        let rates: Vec<f64> = [50u64, 20, 10, 5, 1]
            .iter()
            .map(|ms| simulate(Duration::from_millis(*ms), total))
            .collect();
        for pair in rates.windows(2) {
            assert!(pair[0] <= pair[1], "{rates:?}");
        }
    }

    #[test]
    fn test_reader_sees_published_value() {
        let mut counter = FrequencyCounter::with_window(Duration::from_millis(100));
        let reader = counter.reader();
        let start = Instant::now();
        counter.signal_at(1, start);
        for i in 1..=10u64 {
            counter.signal_at(1, start + Duration::from_millis(i * 10));
        }
        assert!((reader.frequency() - 100.0).abs() < 1e-6);

        counter.reset();
        assert_eq!(reader.frequency(), 0.0);
    }
}
