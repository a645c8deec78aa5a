//! Frame timing.
//!
//! [`FrameClock`] is the single source of elapsed time for the visualizer:
//! shockwave start times, shader animation and core hue rotation all read
//! the same clock.

use std::time::{Duration, Instant};

/// Elapsed time, frame delta, frame count and a periodically refreshed FPS.
#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a clock at zero.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_secs(5),
        }
    }

    /// Advance to now. Call once per frame.
    ///
    /// Returns `(elapsed, delta)`.
    pub fn tick(&mut self) -> (f32, f32) {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> (f32, f32) {
        self.delta_secs = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.saturating_duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
            log::info!("{:.1} fps ({} frames)", self.fps, self.frame_count);
        }

        (self.elapsed_secs, self.delta_secs)
    }

    /// Seconds since start, as of the last tick.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last report interval. Zero until the
    /// first interval completes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Set how often FPS is recomputed and logged.
    pub fn set_fps_interval(&mut self, interval: Duration) {
        self.fps_update_interval = interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_is_zeroed() {
        let clock = FrameClock::new();
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.delta(), 0.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_tick_advances() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let (elapsed, delta) = clock.tick_at(start + Duration::from_millis(100));
        assert!((elapsed - 0.1).abs() < 1e-4);
        assert!((delta - 0.1).abs() < 1e-4);

        let (elapsed, delta) = clock.tick_at(start + Duration::from_millis(150));
        assert!((elapsed - 0.15).abs() < 1e-4);
        assert!((delta - 0.05).abs() < 1e-4);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_fps_updates_after_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.set_fps_interval(Duration::from_secs(1));

        for i in 1..=60 {
            clock.tick_at(start + Duration::from_millis(i * 1000 / 60));
        }
        assert!((clock.fps() - 60.0).abs() < 1.0, "fps {}", clock.fps());
    }

    #[test]
    fn test_elapsed_never_decreases() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start + Duration::from_secs(1));
        let (elapsed, delta) = clock.tick_at(start);
        assert_eq!(elapsed, 0.0);
        assert_eq!(delta, 0.0);
    }
}
