use glam::Vec2;
use pf_core::animation::FrameAnimator;
use pf_core::timer::Timer;

use crate::assets::{Frames, ImageId};
use crate::collision::{Axis, CollisionGrid, Side};
use crate::entity::Sprite;
use crate::rect::FRect;
use crate::settings;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1 left, 1 right, 0 idle. Held keys on both sides cancel out.
    pub move_x: f32,
    /// Edge-triggered: true only on the frame the jump key went down.
    pub jump_pressed: bool,
    pub fire_held: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig {
    pub speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub hitbox_inset: f32,
    pub animation_fps: u32,
    pub airborne_frame: usize,
    pub shoot_cooldown_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: settings::PLAYER_SPEED,
            gravity: settings::GRAVITY,
            jump_speed: settings::JUMP_SPEED,
            hitbox_inset: settings::PLAYER_HITBOX_INSET,
            animation_fps: settings::PLAYER_ANIMATION_FPS,
            airborne_frame: settings::PLAYER_AIRBORNE_FRAME,
            shoot_cooldown_ms: settings::SHOOT_COOLDOWN_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
}

/// Request raised when the player fires; the game places the bullet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBullet {
    /// Centre of the player's sprite when the shot was fired.
    pub origin: Vec2,
    /// -1 left, 1 right.
    pub direction: f32,
}

/// Where the player is this frame, as seen by effects that track it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSnapshot {
    pub rect: FRect,
    pub facing_left: bool,
}

#[derive(Debug)]
pub struct Player {
    /// Physics shape; narrower than the sprite so the art can overhang edges.
    pub hitbox: FRect,
    pub velocity: Vec2,
    pub facing_left: bool,
    /// Result of the floor probe at the end of the previous step.
    pub on_floor: bool,
    pub contacts: ContactState,
    pub animator: FrameAnimator,
    pub shoot_timer: Timer,
    pub frames: Frames,
    pub config: PlayerConfig,
}

impl Player {
    pub fn new(visual: FRect, frames: Frames, config: PlayerConfig) -> Self {
        Self {
            hitbox: visual.inflate(-config.hitbox_inset, 0.0),
            velocity: Vec2::ZERO,
            facing_left: false,
            on_floor: false,
            contacts: ContactState::default(),
            animator: FrameAnimator::new(config.animation_fps),
            shoot_timer: Timer::from_millis(config.shoot_cooldown_ms, false),
            frames,
            config,
        }
    }

    pub fn direction(&self) -> f32 {
        if self.facing_left {
            -1.0
        } else {
            1.0
        }
    }

    /// Advance one frame. Returns a spawn request when a shot was fired.
    pub fn step(
        &mut self,
        sprite: &mut Sprite,
        input: PlayerInput,
        dt_us: u64,
        grid: &CollisionGrid,
    ) -> Option<SpawnBullet> {
        let dt = dt_us as f32 / 1_000_000.0;

        // Cooldown advances before the fire check reads it.
        self.shoot_timer.update(dt_us);
        let fire = self.apply_input(input);

        self.move_and_collide(dt, grid);
        sprite.rect.set_center(self.hitbox.center());
        self.on_floor = grid.is_on_floor(&self.hitbox);

        self.animate(dt_us);
        sprite.image = self.current_frame();
        sprite.flip_x = self.facing_left;

        fire.then(|| SpawnBullet {
            origin: sprite.rect.center(),
            direction: self.direction(),
        })
    }

    /// Applies intent to velocity and facing. Returns true if a shot fires.
    pub fn apply_input(&mut self, input: PlayerInput) -> bool {
        let move_x = input.move_x.clamp(-1.0, 1.0);
        self.velocity.x = move_x * self.config.speed;
        if move_x != 0.0 {
            self.facing_left = move_x < 0.0;
        }

        // Jump only from the floor, using last frame's probe.
        if input.jump_pressed && self.on_floor {
            self.velocity.y = -self.config.jump_speed;
        }

        if input.fire_held && !self.shoot_timer.is_active() {
            self.shoot_timer.start();
            return true;
        }
        false
    }

    fn move_and_collide(&mut self, dt: f32, grid: &CollisionGrid) {
        self.contacts = ContactState::default();

        self.hitbox.translate(self.velocity.x * dt, 0.0);
        match grid.resolve_axis(&mut self.hitbox, Axis::Horizontal, self.velocity.x) {
            Some(Side::Left) => self.contacts.left = true,
            Some(Side::Right) => self.contacts.right = true,
            _ => {}
        }

        self.velocity.y += self.config.gravity * dt;
        self.hitbox.translate(0.0, self.velocity.y * dt);
        match grid.resolve_axis(&mut self.hitbox, Axis::Vertical, self.velocity.y) {
            Some(Side::Bottom) => {
                self.contacts.down = true;
                self.velocity.y = 0.0;
            }
            // A ceiling bump only clamps position; the rise carries on until gravity wins.
            Some(Side::Top) => self.contacts.up = true,
            _ => {}
        }
    }

    fn animate(&mut self, dt_us: u64) {
        if self.velocity.x != 0.0 {
            self.animator.tick(dt_us);
        } else {
            self.animator.reset();
        }
    }

    /// Walk cycle on the floor, a fixed frame in the air.
    pub fn current_frame(&self) -> ImageId {
        if self.on_floor {
            self.frames.get(self.animator.index(self.frames.count()))
        } else {
            self.frames.get(self.config.airborne_frame)
        }
    }

    pub fn snapshot(&self, sprite: &Sprite) -> PlayerSnapshot {
        PlayerSnapshot {
            rect: sprite.rect,
            facing_left: self.facing_left,
        }
    }

    /// Point effects attach to: the sprite's leading edge, a little low.
    pub fn muzzle(snapshot: &PlayerSnapshot) -> Vec2 {
        let edge = if snapshot.facing_left {
            snapshot.rect.mid_left()
        } else {
            snapshot.rect.mid_right()
        };
        edge + Vec2::new(0.0, settings::FIRE_Y_OFFSET)
    }
}
