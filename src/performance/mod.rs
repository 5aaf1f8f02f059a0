//! # Frame Timing
//!
//! Measures the time between frames. The last frame's duration drives camera
//! movement; a rolling average over recent frames feeds the debug panel's
//! frame time and FPS readout.
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use phong_viewer::performance::FrameTimer;
//!
//! let start = Instant::now();
//! let mut timer = FrameTimer::new(start);
//! let dt = timer.tick(start + Duration::from_millis(16));
//! assert!((dt - 0.016).abs() < 1e-6);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of frames averaged for the readout
pub const DEFAULT_SAMPLES: usize = 120;

pub struct FrameTimer {
    last_frame: Instant,
    /// Ring buffer of recent frame times for averaging
    frame_times: VecDeque<Duration>,
    max_samples: usize,
}

impl FrameTimer {
    pub fn new(now: Instant) -> Self {
        Self::with_samples(now, DEFAULT_SAMPLES)
    }

    pub fn with_samples(now: Instant, max_samples: usize) -> Self {
        Self {
            last_frame: now,
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    /// Starts a new frame and returns the previous frame's duration in seconds
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        if self.frame_times.len() == self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(elapsed);

        elapsed.as_secs_f32()
    }

    /// Average frame time in milliseconds over the sample window
    pub fn frame_time_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        total.as_secs_f32() * 1000.0 / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let frame_time_ms = self.frame_time_ms();
        if frame_time_ms > 0.0 {
            1000.0 / frame_time_ms
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_returns_elapsed_seconds() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        let dt = timer.tick(start + Duration::from_millis(250));
        assert!((dt - 0.25).abs() < 1e-6);
        let dt = timer.tick(start + Duration::from_millis(300));
        assert!((dt - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_empty_timer_reports_zero() {
        let timer = FrameTimer::new(Instant::now());
        assert_eq!(timer.frame_time_ms(), 0.0);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn test_average_and_fps() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        timer.tick(start + Duration::from_millis(10));
        timer.tick(start + Duration::from_millis(40));
        assert!((timer.frame_time_ms() - 20.0).abs() < 1e-3);
        assert!((timer.fps() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_window_drops_oldest_sample() {
        let start = Instant::now();
        let mut timer = FrameTimer::with_samples(start, 2);
        timer.tick(start + Duration::from_millis(100));
        timer.tick(start + Duration::from_millis(110));
        timer.tick(start + Duration::from_millis(120));
        assert!((timer.frame_time_ms() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_clock_going_backwards_yields_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut timer = FrameTimer::new(start);
        assert_eq!(timer.tick(start - Duration::from_millis(5)), 0.0);
    }
}
