//! CPU-side sprite batching. The whole scene is rebuilt into one vertex and
//! index list each frame. Consecutive quads sharing a texture are merged into
//! a single draw call.

use pf_render::vertex::QUAD_INDICES;
use pf_render::SpriteVertex;

use crate::assets::ImageId;
use crate::collision::CollisionGrid;
use crate::game::Game;
use crate::rect::FRect;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const SOLID_DEBUG_COLOR: [f32; 4] = [0.15, 0.9, 0.15, 0.35];
const HITBOX_DEBUG_COLOR: [f32; 4] = [1.0, 0.3, 0.3, 0.5];
const PROBE_DEBUG_COLOR: [f32; 4] = [1.0, 1.0, 0.2, 0.9];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Image(ImageId),
    /// 1x1 white, tinted by vertex colour.
    DebugWhite,
}

/// A contiguous run of indices drawn with one texture binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureKey,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SceneMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

impl SceneMesh {
    pub fn with_quad_capacity(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            draw_calls: Vec::with_capacity(16),
        }
    }

    pub fn add_quad(&mut self, texture: TextureKey, rect: &FRect, flip_x: bool, color: [f32; 4]) {
        let base_index = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&SpriteVertex::quad(
            rect.x, rect.y, rect.w, rect.h, flip_x, color,
        ));
        let draw_start = self.indices.len() as u32;
        self.indices
            .extend(QUAD_INDICES.iter().map(|index| base_index + index));
        push_draw_call(&mut self.draw_calls, texture, draw_start, 6);
    }

    #[cfg(test)]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
}

/// Everything visible in `view`, back to front, with optional collision
/// overlays on top.
pub fn build_scene_mesh(game: &Game, view: &FRect, collision_debug: bool) -> SceneMesh {
    let sprites = game.draw_order();
    let mut mesh = SceneMesh::with_quad_capacity(sprites.len() + 8);

    for sprite in sprites {
        if !sprite.rect.intersects(view) {
            continue;
        }
        mesh.add_quad(
            TextureKey::Image(sprite.image),
            &sprite.rect,
            sprite.flip_x,
            WHITE,
        );
    }

    if collision_debug {
        let grid = game.grid();
        for cell in grid.solids_iter() {
            let rect = grid.cell_rect(*cell);
            if rect.intersects(view) {
                mesh.add_quad(TextureKey::DebugWhite, &rect, false, SOLID_DEBUG_COLOR);
            }
        }
        if let Some(player) = game.player() {
            mesh.add_quad(
                TextureKey::DebugWhite,
                &player.hitbox,
                false,
                HITBOX_DEBUG_COLOR,
            );
            mesh.add_quad(
                TextureKey::DebugWhite,
                &CollisionGrid::floor_probe(&player.hitbox),
                false,
                PROBE_DEBUG_COLOR,
            );
        }
    }

    mesh
}

/// Append a draw call, merging with the previous one when the texture matches
/// and the indices are contiguous.
fn push_draw_call(
    draw_calls: &mut Vec<DrawCall>,
    texture: TextureKey,
    index_start: u32,
    index_count: u32,
) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if last.texture == texture && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture,
        index_start,
        index_count,
    });
}

/// Texture rebinds the draw list will cost.
pub fn count_texture_binds(draw_calls: &[DrawCall]) -> usize {
    let mut binds = 0;
    let mut last = None;
    for draw in draw_calls {
        if last != Some(draw.texture) {
            binds += 1;
            last = Some(draw.texture);
        }
    }
    binds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tests::test_game;

    fn rect(x: f32) -> FRect {
        FRect::new(x, 0.0, 10.0, 10.0)
    }

    #[test]
    fn same_texture_quads_merge_into_one_call() {
        let mut mesh = SceneMesh::default();
        let a = TextureKey::Image(ImageId::from_index(0));
        let b = TextureKey::Image(ImageId::from_index(1));
        mesh.add_quad(a, &rect(0.0), false, WHITE);
        mesh.add_quad(a, &rect(10.0), false, WHITE);
        mesh.add_quad(b, &rect(20.0), false, WHITE);
        mesh.add_quad(a, &rect(30.0), false, WHITE);

        assert_eq!(mesh.quad_count(), 4);
        assert_eq!(mesh.indices.len(), 24);
        assert_eq!(
            mesh.draw_calls,
            vec![
                DrawCall {
                    texture: a,
                    index_start: 0,
                    index_count: 12
                },
                DrawCall {
                    texture: b,
                    index_start: 12,
                    index_count: 6
                },
                DrawCall {
                    texture: a,
                    index_start: 18,
                    index_count: 6
                },
            ]
        );
        assert_eq!(count_texture_binds(&mesh.draw_calls), 3);
        assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn sprites_outside_view_are_culled() {
        let game = test_game(1);
        let everything = FRect::new(-10_000.0, -10_000.0, 40_000.0, 40_000.0);
        let all = build_scene_mesh(&game, &everything, false);
        assert_eq!(all.quad_count(), game.world().len());

        // Left quarter of the level: 5 floor tiles, decoration, player.
        let left = FRect::new(0.0, 0.0, 320.0, 512.0);
        let culled = build_scene_mesh(&game, &left, false);
        assert_eq!(culled.quad_count(), 7);
    }

    #[test]
    fn collision_debug_adds_overlay_quads_last() {
        let game = test_game(1);
        let view = FRect::new(0.0, 0.0, 1920.0, 512.0);
        let plain = build_scene_mesh(&game, &view, false);
        let debug = build_scene_mesh(&game, &view, true);
        // Every solid cell, the hitbox and the floor probe.
        assert_eq!(debug.quad_count(), plain.quad_count() + 30 + 2);
        assert_eq!(
            debug.draw_calls.last().map(|d| d.texture),
            Some(TextureKey::DebugWhite)
        );
    }
}
