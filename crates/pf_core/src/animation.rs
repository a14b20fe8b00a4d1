//! Frame-cycle animation: a running clock mapped onto a list of frames.
//!
//! Every animated entity in the game cycles a flat list of images at a fixed
//! rate and indexes it modulo its length. The animator only tracks time; the
//! frame list lives with the entity so flipped/unflipped or per-variant lists
//! can share one clock.
//!
//! Timing is integer microseconds so advancement is identical across runs.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAnimator {
    pub frame_duration_us: u64,
    pub elapsed_us: u64,
}

impl FrameAnimator {
    /// Animator advancing `frames_per_second` frames each second.
    pub fn new(frames_per_second: u32) -> Self {
        Self {
            frame_duration_us: 1_000_000 / u64::from(frames_per_second.max(1)),
            elapsed_us: 0,
        }
    }

    pub fn tick(&mut self, dt_us: u64) {
        self.elapsed_us = self.elapsed_us.wrapping_add(dt_us);
    }

    pub fn reset(&mut self) {
        self.elapsed_us = 0;
    }

    /// Frames elapsed since the last reset, unbounded.
    pub fn frame_count(&self) -> u64 {
        self.elapsed_us / self.frame_duration_us
    }

    /// Current frame index into a list of `len` frames (0 for an empty list).
    pub fn index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.frame_count() % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_advances_with_elapsed_time() {
        let mut anim = FrameAnimator::new(10);
        assert_eq!(anim.index(4), 0);

        anim.tick(50_000);
        assert_eq!(anim.index(4), 0);

        anim.tick(60_000);
        assert_eq!(anim.index(4), 1);
    }

    #[test]
    fn index_wraps_modulo_len() {
        let mut anim = FrameAnimator::new(10);
        anim.tick(450_000);
        assert_eq!(anim.frame_count(), 4);
        assert_eq!(anim.index(3), 1);
    }

    #[test]
    fn reset_returns_to_first_frame() {
        let mut anim = FrameAnimator::new(5);
        anim.tick(900_000);
        assert_ne!(anim.index(8), 0);
        anim.reset();
        assert_eq!(anim.index(8), 0);
    }

    #[test]
    fn empty_frame_list_maps_to_zero() {
        let mut anim = FrameAnimator::new(10);
        anim.tick(1_000_000);
        assert_eq!(anim.index(0), 0);
    }

    #[test]
    fn determinism_identical_results() {
        let dt = 8_333u64;
        let mut a = FrameAnimator::new(12);
        let mut b = FrameAnimator::new(12);
        for _ in 0..500 {
            a.tick(dt);
            b.tick(dt);
            assert_eq!(a.index(6), b.index(6));
        }
        assert_eq!(a, b);
    }
}
