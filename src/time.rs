//! Frame clock for hosts driving the simulation.
//!
//! The simulation never reads a clock itself; [`Simulation::step`] takes
//! whatever delta it is handed. `Time` is the optional helper that turns wall
//! time into those deltas, with pause, time scale, a fixed-delta mode and a
//! stall guard that caps any single delta at `max_delta`.
//!
//! # Example
//!
//! ```
//! use fanflow::time::Time;
//!
//! let mut time = Time::new();
//! time.set_fixed_delta(Some(1.0 / 60.0));
//!
//! let dt = time.update();
//! assert!((dt - 1.0 / 60.0).abs() < 1e-6);
//! assert_eq!(time.frame(), 1);
//! ```
//!
//! [`Simulation::step`]: crate::Simulation::step

use crate::simulation::DEFAULT_MAX_DELTA;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Wall-clock frame timing with a capped delta.
#[derive(Debug)]
pub struct Time {
    /// When the last frame occurred.
    last_frame: Instant,
    /// Scaled simulated seconds since start.
    elapsed_secs: f32,
    /// Delta handed out by the last update.
    delta_secs: f32,
    /// Total frames since start.
    frame_count: u64,
    /// Frames per second, refreshed every `fps_update_interval`.
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Fixed delta used instead of wall time, if set.
    fixed_delta: Option<f32>,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
    /// Upper bound on any single delta.
    max_delta: f32,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            fixed_delta: None,
            time_scale: 1.0,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }

    /// Read the wall clock and produce this frame's delta.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let dt = self.advance(raw);

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        dt
    }

    /// Produce this frame's delta from a host-measured raw delta.
    ///
    /// Applies pause, fixed delta, time scale and the `max_delta` cap, in
    /// that order. Paused frames return 0 but still count.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        self.frame_count += 1;

        if self.paused {
            self.delta_secs = 0.0;
            return 0.0;
        }

        let raw = self.fixed_delta.unwrap_or(raw_delta);
        let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
        let scaled = raw * self.time_scale;
        if scaled > self.max_delta {
            debug!("frame delta {:.3}s capped to {:.3}s", scaled, self.max_delta);
        }
        self.delta_secs = scaled.min(self.max_delta);
        self.elapsed_secs += self.delta_secs;
        self.delta_secs
    }

    /// Simulated seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Delta produced by the last update.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Calculated frames per second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether time is currently paused.
    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current time scale multiplier.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Current delta cap.
    #[inline]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Pause time progression.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after pausing. The paused interval is not replayed.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_frame = Instant::now();
            self.paused = false;
        }
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Use a fixed delta instead of wall time. `None` returns to wall time.
    pub fn set_fixed_delta(&mut self, delta: Option<f32>) {
        self.fixed_delta = delta;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Set the delta cap. Non-positive or non-finite values are ignored.
    pub fn set_max_delta(&mut self, max_delta: f32) {
        if max_delta.is_finite() && max_delta > 0.0 {
            self.max_delta = max_delta;
        } else {
            warn!("ignoring max delta {}", max_delta);
        }
    }

    /// Reset counters to zero. Settings are kept.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.last_frame = now;
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.fps = 0.0;
        self.fps_frame_count = 0;
        self.fps_update_time = now;
        self.paused = false;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
