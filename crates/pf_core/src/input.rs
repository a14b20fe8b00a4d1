//! Keyboard state with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every frame the key is
//!   physically down. Movement and the fire trigger read this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   frame the transition happened, cleared by `end_frame()` after the tick
//!   has consumed them. Jumping reads `just_pressed` so holding the key does
//!   not bounce the player on landing.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    F3,
    F4,
    A,
    D,
    Q,
    S,
    W,
    X,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// True if any of `keys` is held.
    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_held(*k))
    }

    /// True if any of `keys` went down this frame.
    pub fn any_just_pressed(&self, keys: &[Key]) -> bool {
        keys.iter().any(|k| self.is_just_pressed(*k))
    }

    /// Horizontal axis in {-1, 0, 1} from two key groups.
    pub fn axis(&self, negative: &[Key], positive: &[Key]) -> f32 {
        let mut value = 0.0;
        if self.any_held(negative) {
            value -= 1.0;
        }
        if self.any_held(positive) {
            value += 1.0;
        }
        value
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.key_up(Key::Space);
        assert!(!input.is_held(Key::Space));
        assert!(input.is_just_released(Key::Space));
    }

    #[test]
    fn test_key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::A);
        assert!(!input.is_just_released(Key::A));
        assert!(!input.is_held(Key::A));
    }

    #[test]
    fn test_end_frame_clears_transient_state() {
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::D));
        assert!(!input.is_just_pressed(Key::Space));
        // Held state persists across frames.
        assert!(input.is_held(Key::D));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn test_repeat_key_down_does_not_retrigger_after_end_frame() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        input.end_frame();
        // OS key repeat delivers another press while still held.
        input.key_down(Key::Space);
        assert!(!input.is_just_pressed(Key::Space));
    }

    #[test]
    fn test_axis_combines_key_groups() {
        let mut input = InputState::new();
        assert_eq!(input.axis(&[Key::Left, Key::Q], &[Key::Right, Key::D]), 0.0);

        input.key_down(Key::Q);
        assert_eq!(input.axis(&[Key::Left, Key::Q], &[Key::Right, Key::D]), -1.0);

        input.key_down(Key::Right);
        assert_eq!(input.axis(&[Key::Left, Key::Q], &[Key::Right, Key::D]), 0.0);

        input.key_up(Key::Q);
        assert_eq!(input.axis(&[Key::Left, Key::Q], &[Key::Right, Key::D]), 1.0);
    }

    #[test]
    fn test_any_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::W);
        assert!(input.any_just_pressed(&[Key::Space, Key::W]));
        assert!(!input.any_just_pressed(&[Key::Space, Key::Up]));
    }
}
