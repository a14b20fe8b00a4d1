use pf_core::timer::Timer;

use crate::entity::Sprite;
use crate::player::{Player, PlayerSnapshot};
use crate::settings::FIRE_LIFETIME_MS;

/// Straight-line shot. Lives until it hits an enemy or leaves `x_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub direction: f32,
    pub speed: f32,
}

impl Bullet {
    pub fn new(direction: f32, speed: f32) -> Self {
        Self { direction, speed }
    }

    /// Returns false once the bullet is wholly outside `x_range`.
    pub fn update(&self, sprite: &mut Sprite, dt_us: u64, x_range: (f32, f32)) -> bool {
        let dt = dt_us as f32 / 1_000_000.0;
        sprite.rect.translate(self.direction * self.speed * dt, 0.0);
        sprite.rect.right() > x_range.0 && sprite.rect.left() < x_range.1
    }
}

/// Muzzle flash pinned to the player's gun for a short time.
#[derive(Debug)]
pub struct Fire {
    pub timer: Timer,
    pub facing_left: bool,
}

impl Fire {
    pub fn new(facing_left: bool) -> Self {
        Self {
            timer: Timer::from_millis(FIRE_LIFETIME_MS, false).autostart(),
            facing_left,
        }
    }

    /// Mirror the flash and butt it against the muzzle.
    pub fn attach(&self, sprite: &mut Sprite, player: &PlayerSnapshot) {
        let muzzle = Player::muzzle(player);
        if self.facing_left {
            sprite.rect.set_mid_right(muzzle);
        } else {
            sprite.rect.set_mid_left(muzzle);
        }
        sprite.flip_x = self.facing_left;
    }

    /// Returns false when the flash should go: lifetime over, the player
    /// turned around, or there is no player to follow.
    pub fn update(
        &mut self,
        sprite: &mut Sprite,
        player: Option<&PlayerSnapshot>,
        dt_us: u64,
    ) -> bool {
        let Some(player) = player else {
            return false;
        };
        if player.facing_left != self.facing_left {
            return false;
        }
        if self.timer.update(dt_us) {
            return false;
        }
        self.attach(sprite, player);
        true
    }
}
