//! Enemy motion. Bees fly in from the right and leave off the left edge of
//! the level. Worms patrol back and forth inside the rect they were placed in.

use pf_core::animation::FrameAnimator;

use crate::assets::Frames;
use crate::entity::Sprite;
use crate::rect::FRect;
use crate::settings::ENEMY_ANIMATION_FPS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyBehavior {
    Flying,
    Walking { bounds: FRect, direction: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyStatus {
    Alive,
    /// Left the level; remove without scoring or sound.
    Gone,
}

#[derive(Debug)]
pub struct Enemy {
    pub frames: Frames,
    pub animator: FrameAnimator,
    pub speed: f32,
    pub behavior: EnemyBehavior,
}

impl Enemy {
    pub fn bee(frames: Frames, speed: f32) -> Self {
        Self {
            frames,
            animator: FrameAnimator::new(ENEMY_ANIMATION_FPS),
            speed,
            behavior: EnemyBehavior::Flying,
        }
    }

    pub fn worm(frames: Frames, speed: f32, bounds: FRect) -> Self {
        Self {
            frames,
            animator: FrameAnimator::new(ENEMY_ANIMATION_FPS),
            speed,
            behavior: EnemyBehavior::Walking {
                bounds,
                direction: 1.0,
            },
        }
    }

    pub fn update(&mut self, sprite: &mut Sprite, dt_us: u64) -> EnemyStatus {
        let dt = dt_us as f32 / 1_000_000.0;
        self.animator.tick(dt_us);
        sprite.image = self.frames.get(self.animator.index(self.frames.count()));

        let rect = &mut sprite.rect;
        match &mut self.behavior {
            EnemyBehavior::Flying => {
                rect.translate(-self.speed * dt, 0.0);
                if rect.right() <= 0.0 {
                    return EnemyStatus::Gone;
                }
            }
            EnemyBehavior::Walking { bounds, direction } => {
                rect.translate(*direction * self.speed * dt, 0.0);
                if *direction > 0.0 && rect.right() >= bounds.right() {
                    rect.set_right(bounds.right());
                    *direction = -1.0;
                } else if *direction < 0.0 && rect.left() <= bounds.left() {
                    rect.set_left(bounds.left());
                    *direction = 1.0;
                }
                sprite.flip_x = *direction < 0.0;
            }
        }
        EnemyStatus::Alive
    }
}
