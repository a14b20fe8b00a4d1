//! Deferred requests raised during entity updates and drained by the game
//! once per frame.

use crate::player::SpawnBullet;

/// Events collected during the frame and drained at a fixed point.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Drains in send order.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// World mutations an entity may request but not perform itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SpawnBullet(SpawnBullet),
}

/// Sounds the game wants played. Playback belongs to whoever drains them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    Shoot,
    Impact,
}

impl AudioCue {
    /// Stem of the clip file in the audio folder.
    pub fn clip_name(self) -> &'static str {
        match self {
            AudioCue::Shoot => "shoot",
            AudioCue::Impact => "impact",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_order_and_empties() {
        let mut queue = EventQueue::new();
        queue.send(AudioCue::Shoot);
        queue.send(AudioCue::Impact);
        assert_eq!(queue.len(), 2);
        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained, vec![AudioCue::Shoot, AudioCue::Impact]);
        assert!(queue.is_empty());
    }
}
