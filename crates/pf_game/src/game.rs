//! Frame orchestration: builds the world from a level, advances it one frame
//! at a time, and resolves gameplay collisions.
//!
//! A frame runs in a fixed order:
//!  1. the enemy spawn timer
//!  2. the player, then every other actor in creation order
//!  3. commands the updates raised (shots)
//!  4. bullets against enemies, the player against gifts, the player
//!     against enemies
//!
//! Touching an enemy ends the game. After that `tick` is a no-op and the last
//! frame stays on screen.

use glam::Vec2;
use pf_core::timer::Timer;
use rand::rngs::StdRng;
use rand::Rng;

use crate::assets::{GameAssets, ImageBank};
use crate::collision::{masks_overlap, CollisionGrid, GridCell};
use crate::enemy::{Enemy, EnemyStatus};
use crate::entity::{DrawLayer, Entity, EntityKind, Sprite};
use crate::events::{AudioCue, Command, EventQueue};
use crate::level::{
    LevelFile, DECORATION_LAYER, ENTITIES_LAYER, GIFT_OBJECT, MAIN_LAYER, PLAYER_OBJECT,
    WALKER_OBJECTS,
};
use crate::player::{Player, PlayerConfig, PlayerInput, PlayerSnapshot, SpawnBullet};
use crate::projectile::{Bullet, Fire};
use crate::rect::FRect;
use crate::settings;
use crate::world::{EntityId, Role, World};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameStats {
    pub entities: usize,
    pub enemies: usize,
    pub bullets: usize,
    pub gifts: usize,
}

pub struct Game {
    world: World,
    grid: CollisionGrid,
    assets: GameAssets,
    player_id: EntityId,
    enemy_timer: Timer,
    commands: EventQueue<Command>,
    cues: EventQueue<AudioCue>,
    rng: StdRng,
    score: u32,
    running: bool,
    frame: u64,
    level_width: f32,
    level_height: f32,
}

impl Game {
    pub fn new(level: &LevelFile, assets: GameAssets, mut rng: StdRng) -> Result<Self, String> {
        let tile_size = level.tile_size as f32;
        let mut world = World::new();
        let mut grid = CollisionGrid::new(tile_size, level.width as i32, level.height as i32);

        for (layer, solid) in [(MAIN_LAYER, true), (DECORATION_LAYER, false)] {
            for placement in level.tiles(layer) {
                let image = *assets.tiles.get(placement.image).ok_or_else(|| {
                    format!("Level tile image '{}' was not loaded", placement.image)
                })?;
                let cell = GridCell {
                    x: placement.x,
                    y: placement.y,
                };
                let sprite = Sprite::new(grid.cell_rect(cell), image);
                let entity = Entity::new(sprite, DrawLayer::Terrain, EntityKind::Tile);
                if solid {
                    grid.insert(cell);
                    world.spawn(entity, &[Role::Collision]);
                } else {
                    world.spawn(entity, &[]);
                }
            }
        }

        let mut player_id = None;
        for object in level.objects(ENTITIES_LAYER) {
            let position = Vec2::new(object.x, object.y);
            if object.name == PLAYER_OBJECT {
                player_id = Some(spawn_player(&mut world, &assets, position));
            } else if object.name == GIFT_OBJECT {
                spawn_gift(&mut world, &assets, position);
            } else if WALKER_OBJECTS.contains(&object.name.as_str()) {
                let speed = rng.gen_range(settings::WORM_SPEED_RANGE) as f32;
                spawn_worm(&mut world, &assets, object.rect(), speed);
            } else {
                log::warn!("Skipping unknown level object '{}'", object.name);
            }
        }
        let player_id = player_id
            .ok_or_else(|| format!("Level '{}' has no '{PLAYER_OBJECT}' object", level.level_id))?;

        log::info!(
            "Level '{}' built: {} entities, {} solid tiles",
            level.level_id,
            world.len(),
            grid.solid_count()
        );

        Ok(Self {
            world,
            grid,
            assets,
            player_id,
            enemy_timer: Timer::from_millis(settings::BEE_SPAWN_INTERVAL_MS, true).autostart(),
            commands: EventQueue::new(),
            cues: EventQueue::new(),
            rng,
            score: 0,
            running: true,
            frame: 0,
            level_width: level.pixel_width(),
            level_height: level.pixel_height(),
        })
    }

    /// Advance one frame by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: PlayerInput) {
        if !self.running {
            return;
        }
        let dt_us = (dt.max(0.0) * 1_000_000.0).round() as u64;
        self.frame += 1;

        if self.enemy_timer.update(dt_us) {
            self.spawn_random_bee();
        }

        let player = self.update_player(input, dt_us);
        self.update_actors(player.as_ref(), dt_us);
        self.apply_commands();
        self.resolve_interactions();
    }

    fn update_player(&mut self, input: PlayerInput, dt_us: u64) -> Option<PlayerSnapshot> {
        let Entity { sprite, kind, .. } = self.world.get_mut(self.player_id)?;
        let EntityKind::Player(player) = kind else {
            return None;
        };
        if let Some(shot) = player.step(sprite, input, dt_us, &self.grid) {
            self.commands.send(Command::SpawnBullet(shot));
        }
        Some(player.snapshot(sprite))
    }

    fn update_actors(&mut self, player: Option<&PlayerSnapshot>, dt_us: u64) {
        let x_range = (
            -(settings::WINDOW_WIDTH as f32),
            self.level_width + 2.0 * settings::WINDOW_WIDTH as f32,
        );
        let mut expired = Vec::new();
        for id in self.world.members(Role::Actor) {
            let Some(Entity { sprite, kind, .. }) = self.world.get_mut(id) else {
                continue;
            };
            let alive = match kind {
                EntityKind::Enemy(enemy) => enemy.update(sprite, dt_us) == EnemyStatus::Alive,
                EntityKind::Bullet(bullet) => bullet.update(sprite, dt_us, x_range),
                EntityKind::Fire(fire) => fire.update(sprite, player, dt_us),
                EntityKind::Tile | EntityKind::Gift | EntityKind::Player(_) => true,
            };
            if !alive {
                expired.push(id);
            }
        }
        for id in expired {
            self.world.kill(id);
        }
    }

    fn apply_commands(&mut self) {
        let commands: Vec<Command> = self.commands.drain().collect();
        for command in commands {
            match command {
                Command::SpawnBullet(shot) => self.fire_shot(shot),
            }
        }
    }

    fn resolve_interactions(&mut self) {
        for bullet in self.world.members(Role::Bullet) {
            let hits: Vec<EntityId> = self
                .world
                .members(Role::Enemy)
                .into_iter()
                .filter(|enemy| self.entities_overlap(bullet, *enemy))
                .collect();
            if hits.is_empty() {
                continue;
            }
            self.world.kill(bullet);
            for enemy in hits {
                self.world.kill(enemy);
                log::debug!("Enemy {} shot down", enemy.raw());
            }
            self.cues.send(AudioCue::Impact);
        }

        let gifts: Vec<EntityId> = self
            .world
            .members(Role::Gift)
            .into_iter()
            .filter(|gift| self.entities_overlap(self.player_id, *gift))
            .collect();
        for gift in gifts {
            self.world.kill(gift);
            self.score += 1;
            log::debug!("Gift collected, score {}", self.score);
        }

        let caught = self
            .world
            .members(Role::Enemy)
            .into_iter()
            .any(|enemy| self.entities_overlap(self.player_id, enemy));
        if caught {
            self.running = false;
            log::info!(
                "Player hit an enemy on frame {}, game over with score {}",
                self.frame,
                self.score
            );
        }
    }

    fn entities_overlap(&self, a: EntityId, b: EntityId) -> bool {
        match (self.world.get(a), self.world.get(b)) {
            (Some(a), Some(b)) => self.sprites_overlap(&a.sprite, &b.sprite),
            _ => false,
        }
    }

    fn sprites_overlap(&self, a: &Sprite, b: &Sprite) -> bool {
        let images = &self.assets.images;
        match (images.mask(a.image, a.flip_x), images.mask(b.image, b.flip_x)) {
            (Some(a_mask), Some(b_mask)) => masks_overlap(&a.rect, a_mask, &b.rect, b_mask),
            // Unknown images fall back to box overlap.
            _ => a.rect.intersects(&b.rect),
        }
    }

    /// Bullet at the gun tip, a muzzle flash, and the shot sound.
    fn fire_shot(&mut self, shot: SpawnBullet) {
        let (width, height) = self.assets.images.size(self.assets.bullet);
        let x = if shot.direction > 0.0 {
            shot.origin.x + settings::MUZZLE_DISTANCE
        } else {
            shot.origin.x - settings::MUZZLE_DISTANCE - width
        };
        let bullet =
            self.spawn_bullet_at(Vec2::new(x, shot.origin.y - height * 0.5), shot.direction);
        log::debug!("Bullet {} fired, direction {}", bullet.raw(), shot.direction);
        self.spawn_fire();
        self.cues.send(AudioCue::Shoot);
    }

    pub fn spawn_bullet_at(&mut self, top_left: Vec2, direction: f32) -> EntityId {
        let (width, height) = self.assets.images.size(self.assets.bullet);
        let mut sprite = Sprite::new(
            FRect::new(top_left.x, top_left.y, width, height),
            self.assets.bullet,
        );
        sprite.flip_x = direction < 0.0;
        let bullet = Bullet::new(direction, settings::BULLET_SPEED);
        self.world.spawn(
            Entity::new(sprite, DrawLayer::Projectiles, EntityKind::Bullet(bullet)),
            &[Role::Bullet, Role::Actor],
        )
    }

    /// Flash at the player's muzzle. None if there is no player.
    pub fn spawn_fire(&mut self) -> Option<EntityId> {
        let player = self.player_snapshot()?;
        let (width, height) = self.assets.images.size(self.assets.fire);
        let mut sprite = Sprite::new(FRect::new(0.0, 0.0, width, height), self.assets.fire);
        let fire = Fire::new(player.facing_left);
        fire.attach(&mut sprite, &player);
        Some(self.world.spawn(
            Entity::new(sprite, DrawLayer::Projectiles, EntityKind::Fire(fire)),
            &[Role::Actor],
        ))
    }

    pub fn spawn_bee_at(&mut self, top_left: Vec2, speed: f32) -> EntityId {
        let frames = self.assets.bee_frames.clone();
        let image = frames.first();
        let (width, height) = self.assets.images.size(image);
        let sprite = Sprite::new(FRect::new(top_left.x, top_left.y, width, height), image);
        self.world.spawn(
            Entity::new(
                sprite,
                DrawLayer::Enemies,
                EntityKind::Enemy(Enemy::bee(frames, speed)),
            ),
            &[Role::Enemy, Role::Actor],
        )
    }

    /// Bee just past the right edge of the level at a random height.
    fn spawn_random_bee(&mut self) -> EntityId {
        let x = self.level_width + settings::WINDOW_WIDTH as f32;
        let y = self.rng.gen_range(0..=self.level_height as u32) as f32;
        let speed = self.rng.gen_range(settings::BEE_SPEED_RANGE) as f32;
        self.spawn_bee_at(Vec2::new(x, y), speed)
    }

    #[cfg(test)]
    pub fn spawn_gift_at(&mut self, top_left: Vec2) -> EntityId {
        spawn_gift(&mut self.world, &self.assets, top_left)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[cfg(test)]
    pub fn level_size(&self) -> Vec2 {
        Vec2::new(self.level_width, self.level_height)
    }

    /// Cues raised since the last drain, in order.
    pub fn drain_cues(&mut self) -> Vec<AudioCue> {
        self.cues.drain().collect()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn grid(&self) -> &CollisionGrid {
        &self.grid
    }

    pub fn images(&self) -> &ImageBank {
        &self.assets.images
    }

    pub fn player(&self) -> Option<&Player> {
        match &self.world.get(self.player_id)?.kind {
            EntityKind::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn player_snapshot(&self) -> Option<PlayerSnapshot> {
        let entity = self.world.get(self.player_id)?;
        match &entity.kind {
            EntityKind::Player(player) => Some(player.snapshot(&entity.sprite)),
            _ => None,
        }
    }

    pub fn stats(&self) -> GameStats {
        GameStats {
            entities: self.world.len(),
            enemies: self.world.role_len(Role::Enemy),
            bullets: self.world.role_len(Role::Bullet),
            gifts: self.world.role_len(Role::Gift),
        }
    }

    /// Sprites back to front.
    pub fn draw_order(&self) -> Vec<&Sprite> {
        let mut sprites: Vec<(DrawLayer, EntityId, &Sprite)> = self
            .world
            .iter()
            .map(|(id, entity)| (entity.layer, id, &entity.sprite))
            .collect();
        sprites.sort_by_key(|(layer, id, _)| (*layer, *id));
        sprites.into_iter().map(|(_, _, sprite)| sprite).collect()
    }
}

/// The map marks the player by its centre.
fn spawn_player(world: &mut World, assets: &GameAssets, center: Vec2) -> EntityId {
    let image = assets.player_frames.first();
    let (width, height) = assets.images.size(image);
    let rect = FRect::from_center(center, width, height);
    let player = Player::new(rect, assets.player_frames.clone(), PlayerConfig::default());
    world.spawn(
        Entity::new(
            Sprite::new(rect, image),
            DrawLayer::Player,
            EntityKind::Player(player),
        ),
        &[],
    )
}

fn spawn_gift(world: &mut World, assets: &GameAssets, top_left: Vec2) -> EntityId {
    let (width, height) = assets.images.size(assets.gift);
    let sprite = Sprite::new(
        FRect::new(top_left.x, top_left.y, width, height),
        assets.gift,
    );
    world.spawn(
        Entity::new(sprite, DrawLayer::Items, EntityKind::Gift),
        &[Role::Gift],
    )
}

/// Worm standing on the bottom of its patrol rect.
fn spawn_worm(world: &mut World, assets: &GameAssets, bounds: FRect, speed: f32) -> EntityId {
    let image = assets.worm_frames.first();
    let (width, height) = assets.images.size(image);
    let mut rect = FRect::new(0.0, 0.0, width, height);
    rect.set_bottom_left(bounds.bottom_left());
    let enemy = Enemy::worm(assets.worm_frames.clone(), speed, bounds);
    world.spawn(
        Entity::new(
            Sprite::new(rect, image),
            DrawLayer::Enemies,
            EntityKind::Enemy(enemy),
        ),
        &[Role::Enemy, Role::Actor],
    )
}
