//! Per-frame clock: one simulation tick per rendered frame.
//!
//! `begin_frame()` measures the wall-clock delta since the previous frame and
//! caps it, so a stall (window drag, breakpoint) cannot teleport entities
//! through level geometry. The capped delta is what gameplay sees as `dt`.

use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 60;

pub struct TimeState {
    pub target_fps: u32,
    pub max_dt: f64,
    pub dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let frame = 1.0 / target_fps as f64;
        Self {
            target_fps,
            max_dt: 0.25,
            dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            last_instant: Instant::now(),
            fps_samples: [frame; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: target_fps as f64,
            smoothed_frame_time_ms: frame * 1000.0,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed an explicit delta. `begin_frame` routes through here; headless
    /// callers use it directly.
    pub fn advance(&mut self, real_dt: f64) {
        self.dt = real_dt.max(0.0);
        if self.dt > self.max_dt {
            log::warn!(
                "Frame took {:.1}ms, capping dt to {}ms",
                self.dt * 1000.0,
                self.max_dt * 1000.0
            );
            self.dt = self.max_dt;
        }
        self.total_time += self.dt;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn dt_secs(&self) -> f32 {
        self.dt as f32
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps as f64)
    }

    /// Earliest instant the next frame should start to hold the target rate.
    pub fn next_frame_deadline(&self) -> Instant {
        self.last_instant + self.frame_duration()
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_caps_large_deltas() {
        let mut time = TimeState::new(120);
        time.advance(3.0);
        assert!((time.dt - time.max_dt).abs() < f64::EPSILON);
        assert_eq!(time.frame_count, 1);
    }

    #[test]
    fn advance_clamps_negative_delta_to_zero() {
        let mut time = TimeState::new(120);
        time.advance(-1.0);
        assert_eq!(time.dt, 0.0);
    }

    #[test]
    fn total_time_accumulates_capped_deltas() {
        let mut time = TimeState::new(60);
        time.advance(0.1);
        time.advance(0.1);
        time.advance(1.0);
        assert!((time.total_time - 0.45).abs() < 1e-9);
    }

    #[test]
    fn frame_duration_follows_target_fps() {
        let time = TimeState::new(120);
        let expected = Duration::from_secs_f64(1.0 / 120.0);
        assert_eq!(time.frame_duration(), expected);
    }

    #[test]
    fn smoothed_fps_tracks_steady_rate() {
        let mut time = TimeState::new(60);
        for _ in 0..FPS_SAMPLE_COUNT {
            time.advance(1.0 / 30.0);
        }
        assert!((time.smoothed_fps - 30.0).abs() < 0.01);
    }
}
