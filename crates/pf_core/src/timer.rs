//! Non-blocking countdown used for cooldowns, spawn cadence and effect lifetimes.
//!
//! A `Timer` is polled once per frame with the frame delta. It is either
//! inactive or counting up towards its duration; on reaching it the optional
//! callback runs, then the timer re-arms (repeating) or goes inactive.
//! `update` also reports the expiry so callers that own the affected state can
//! react without handing the timer a back-reference.
//!
//! Time is integer microseconds, like animation timing, so a run fed the same
//! deltas always expires on the same frame.

use std::fmt;

pub struct Timer {
    duration_us: u64,
    elapsed_us: u64,
    repeat: bool,
    active: bool,
    callback: Option<Box<dyn FnMut()>>,
}

impl Timer {
    pub fn new(duration_us: u64, repeat: bool) -> Self {
        Self {
            duration_us,
            elapsed_us: 0,
            repeat,
            active: false,
            callback: None,
        }
    }

    pub fn from_millis(duration_ms: u64, repeat: bool) -> Self {
        Self::new(duration_ms * 1000, repeat)
    }

    pub fn with_callback(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Start immediately; used for spawn cadence and effect lifetimes.
    pub fn autostart(mut self) -> Self {
        self.start();
        self
    }

    pub fn start(&mut self) {
        self.elapsed_us = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.elapsed_us = 0;
        self.active = false;
    }

    /// Advance by `dt_us`. Returns true on the frame the timer expires.
    ///
    /// Elapsed time saturates at the duration; a repeating timer restarts
    /// from zero rather than carrying the overshoot into the next cycle.
    pub fn update(&mut self, dt_us: u64) -> bool {
        if !self.active {
            return false;
        }

        self.elapsed_us = self.elapsed_us.saturating_add(dt_us).min(self.duration_us);
        if self.elapsed_us < self.duration_us {
            return false;
        }

        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
        if self.repeat {
            self.elapsed_us = 0;
        } else {
            self.stop();
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn duration_us(&self) -> u64 {
        self.duration_us
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("duration_us", &self.duration_us)
            .field("elapsed_us", &self.elapsed_us)
            .field("repeat", &self.repeat)
            .field("active", &self.active)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_timer(duration_us: u64, repeat: bool) -> (Timer, Rc<Cell<u32>>) {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let timer = Timer::new(duration_us, repeat).with_callback(move || {
            counter.set(counter.get() + 1);
        });
        (timer, fired)
    }

    #[test]
    fn inactive_timer_never_fires() {
        let (mut timer, fired) = counting_timer(100_000, false);
        for _ in 0..20 {
            assert!(!timer.update(50_000));
        }
        assert_eq!(fired.get(), 0);
        assert!(!timer.is_active());
        assert_eq!(timer.elapsed_us(), 0);
    }

    #[test]
    fn one_shot_fires_once_then_deactivates() {
        let (mut timer, fired) = counting_timer(100_000, false);
        timer.start();

        assert!(!timer.update(60_000));
        assert!(timer.is_active());
        assert!(timer.update(60_000));
        assert_eq!(fired.get(), 1);
        assert!(!timer.is_active());

        // Further updates are no-ops until restarted.
        assert!(!timer.update(200_000));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn repeating_timer_rearms_from_zero() {
        let (mut timer, fired) = counting_timer(100_000, true);
        timer.start();

        assert!(timer.update(150_000));
        assert!(timer.is_active());
        assert_eq!(timer.elapsed_us(), 0);

        assert!(!timer.update(90_000));
        assert!(timer.update(10_000));
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn elapsed_never_exceeds_duration() {
        let mut timer = Timer::new(100_000, false).autostart();
        timer.update(40_000);
        assert!(timer.elapsed_us() <= timer.duration_us());
        timer.update(u64::MAX);
        assert!(timer.elapsed_us() <= timer.duration_us());
    }

    #[test]
    fn restart_resets_elapsed() {
        let mut timer = Timer::from_millis(100, false).autostart();
        timer.update(80_000);
        timer.start();
        assert_eq!(timer.elapsed_us(), 0);
        assert!(!timer.update(80_000));
        assert!(timer.update(20_000));
    }

    #[test]
    fn stop_cancels_pending_expiry() {
        let (mut timer, fired) = counting_timer(100_000, true);
        timer.start();
        timer.update(99_000);
        timer.stop();
        assert!(!timer.update(10_000));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn fires_without_callback() {
        let mut timer = Timer::from_millis(10, false).autostart();
        assert!(timer.update(10_000));
        assert!(!timer.is_active());
    }
}
