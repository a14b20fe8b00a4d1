//! Compiled-in tuning. Speeds are pixels per second, accelerations pixels per
//! second squared, durations milliseconds. World space is y-down.

use std::ops::RangeInclusive;

pub const WINDOW_TITLE: &str = "Platformer";
pub const WINDOW_WIDTH: u32 = 1280;
pub const WINDOW_HEIGHT: u32 = 720;
pub const FRAMERATE: u32 = 120;
/// sRGB `#fcdfcd`.
pub const BG_COLOR: [u8; 3] = [0xfc, 0xdf, 0xcd];

pub const ASSET_ROOT: &str = "assets";
pub const LEVEL_PATH: &str = "assets/data/levels/world.json";

pub const PLAYER_FRAMES: &[&str] = &["images", "player"];
pub const BULLET_IMAGE: &[&str] = &["images", "gun", "bullet"];
pub const FIRE_IMAGE: &[&str] = &["images", "gun", "fire"];
pub const BEE_FRAMES: &[&str] = &["images", "enemies", "bee"];
pub const WORM_FRAMES: &[&str] = &["images", "enemies", "worm"];
pub const GIFT_IMAGE: &[&str] = &["images", "gift"];
pub const AUDIO_DIR: &[&str] = &["audio"];

/// How long the frozen final frame stays up before the window closes.
pub const GAME_OVER_LINGER_MS: u64 = 2000;

/// Display-only; collecting more is allowed and nothing happens at the target.
pub const SCORE_TARGET: u32 = 3;

pub const PLAYER_SPEED: f32 = 400.0;
pub const GRAVITY: f32 = 3000.0;
pub const JUMP_SPEED: f32 = 1200.0;
/// Total width removed from the visual rect to form the hitbox.
pub const PLAYER_HITBOX_INSET: f32 = 10.0;
pub const FLOOR_PROBE_HEIGHT: f32 = 1.0;
pub const PLAYER_ANIMATION_FPS: u32 = 10;
pub const PLAYER_AIRBORNE_FRAME: usize = 1;
pub const SHOOT_COOLDOWN_MS: u64 = 500;

pub const BULLET_SPEED: f32 = 850.0;
pub const MUZZLE_DISTANCE: f32 = 34.0;
pub const FIRE_LIFETIME_MS: u64 = 100;
pub const FIRE_Y_OFFSET: f32 = 8.0;

pub const ENEMY_ANIMATION_FPS: u32 = 10;
pub const BEE_SPAWN_INTERVAL_MS: u64 = 500;
pub const BEE_SPEED_RANGE: RangeInclusive<u32> = 300..=500;
pub const WORM_SPEED_RANGE: RangeInclusive<u32> = 160..=200;
