use crate::assets::ImageId;
use crate::enemy::Enemy;
use crate::player::Player;
use crate::projectile::{Bullet, Fire};
use crate::rect::FRect;

/// Drawn back to front; ties break on creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Terrain,
    Items,
    Enemies,
    Player,
    Projectiles,
}

/// What gets drawn and what collides: one image at one rect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub rect: FRect,
    pub image: ImageId,
    pub flip_x: bool,
}

impl Sprite {
    pub fn new(rect: FRect, image: ImageId) -> Self {
        Self {
            rect,
            image,
            flip_x: false,
        }
    }
}

#[derive(Debug)]
pub enum EntityKind {
    Tile,
    Gift,
    Player(Player),
    Enemy(Enemy),
    Bullet(Bullet),
    Fire(Fire),
}

#[derive(Debug)]
pub struct Entity {
    pub sprite: Sprite,
    pub layer: DrawLayer,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(sprite: Sprite, layer: DrawLayer, kind: EntityKind) -> Self {
        Self {
            sprite,
            layer,
            kind,
        }
    }
}
