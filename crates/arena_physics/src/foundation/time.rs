//! Time management utilities

use std::time::{Duration, Instant};

/// Splits rendered frames into fixed physics substeps
///
/// Each frame delta is clamped to `max_frame_delta` and divided evenly into
/// `substeps` timesteps, which bounds integration error during frame hitches.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_frame_delta: f64,
    substeps: u32,
    frame_count: u64,
    simulated_time: f64,
}

impl FrameClock {
    /// Create a frame clock
    pub fn new(max_frame_delta: f64, substeps: u32) -> Self {
        Self {
            max_frame_delta,
            substeps: substeps.max(1),
            frame_count: 0,
            simulated_time: 0.0,
        }
    }

    /// Number of substeps per frame
    pub fn substeps(&self) -> u32 {
        self.substeps
    }

    /// Clamp a raw frame delta to the supported range
    pub fn clamp_delta(&self, frame_delta: f64) -> f64 {
        if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.max_frame_delta)
        } else {
            0.0
        }
    }

    /// Timestep of one substep for the given raw frame delta
    pub fn substep_delta(&self, frame_delta: f64) -> f64 {
        self.clamp_delta(frame_delta) / f64::from(self.substeps)
    }

    /// Record a frame advanced by `frame_delta` seconds, returning the substep timestep
    pub fn advance(&mut self, frame_delta: f64) -> f64 {
        let clamped = self.clamp_delta(frame_delta);
        self.simulated_time += clamped;
        self.frame_count += 1;
        clamped / f64::from(self.substeps)
    }

    /// Frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total simulated (clamped) time in seconds
    pub fn simulated_time(&self) -> f64 {
        self.simulated_time
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let running = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + running
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}
