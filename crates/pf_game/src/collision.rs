//! Level collision: solid tiles in a cell grid plus the move-and-slide
//! resolution the player runs against them.
//!
//! Movement is resolved one axis at a time. The hitbox is displaced on an
//! axis, then every overlapping solid snaps the leading edge flush with the
//! solid's opposing edge. Which edge leads is decided by the sign of the
//! velocity on that axis.

use std::collections::HashSet;

use crate::mask::Mask;
use crate::rect::FRect;
use crate::settings::FLOOR_PROBE_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Side of the moving hitbox that came to rest against a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub cell_size: f32,
    pub width: i32,
    pub height: i32,
    solids: HashSet<GridCell>,
}

impl CollisionGrid {
    pub fn new(cell_size: f32, width: i32, height: i32) -> Self {
        Self {
            cell_size,
            width,
            height,
            solids: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn from_solids(
        cell_size: f32,
        width: i32,
        height: i32,
        solids: impl IntoIterator<Item = GridCell>,
    ) -> Self {
        let mut grid = Self::new(cell_size, width, height);
        for cell in solids {
            grid.insert(cell);
        }
        grid
    }

    /// Returns false for cells outside the grid, which are never solid.
    pub fn insert(&mut self, cell: GridCell) -> bool {
        if cell.x < 0 || cell.x >= self.width || cell.y < 0 || cell.y >= self.height {
            return false;
        }
        self.solids.insert(cell)
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.solids.contains(&GridCell { x, y })
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn solids_iter(&self) -> impl Iterator<Item = &GridCell> {
        self.solids.iter()
    }

    pub fn cell_rect(&self, cell: GridCell) -> FRect {
        FRect::new(
            cell.x as f32 * self.cell_size,
            cell.y as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Solid cells whose rects strictly overlap `rect`.
    pub fn solid_rects(&self, rect: &FRect) -> Vec<FRect> {
        let x0 = self.world_to_cell(rect.left());
        let x1 = self.world_to_cell(rect.right());
        let y0 = self.world_to_cell(rect.top());
        let y1 = self.world_to_cell(rect.bottom());
        let mut out = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                if !self.is_solid(x, y) {
                    continue;
                }
                let cell = self.cell_rect(GridCell { x, y });
                if cell.intersects(rect) {
                    out.push(cell);
                }
            }
        }
        out
    }

    /// Snap `hitbox` out of every solid it overlaps on one axis.
    ///
    /// Call after displacing the hitbox on that axis. A zero velocity leaves
    /// overlaps untouched since no edge is leading.
    pub fn resolve_axis(&self, hitbox: &mut FRect, axis: Axis, velocity: f32) -> Option<Side> {
        if velocity == 0.0 {
            return None;
        }
        let mut contact = None;
        for solid in self.solid_rects(hitbox) {
            // An earlier snap may already have cleared this one.
            if !solid.intersects(hitbox) {
                continue;
            }
            contact = Some(match (axis, velocity > 0.0) {
                (Axis::Horizontal, true) => {
                    hitbox.set_right(solid.left());
                    Side::Right
                }
                (Axis::Horizontal, false) => {
                    hitbox.set_left(solid.right());
                    Side::Left
                }
                (Axis::Vertical, true) => {
                    hitbox.set_bottom(solid.top());
                    Side::Bottom
                }
                (Axis::Vertical, false) => {
                    hitbox.set_top(solid.bottom());
                    Side::Top
                }
            });
        }
        contact
    }

    /// Thin strip directly under the hitbox.
    pub fn floor_probe(hitbox: &FRect) -> FRect {
        FRect::new(hitbox.left(), hitbox.bottom(), hitbox.w, FLOOR_PROBE_HEIGHT)
    }

    pub fn is_on_floor(&self, hitbox: &FRect) -> bool {
        !self.solid_rects(&Self::floor_probe(hitbox)).is_empty()
    }

    fn world_to_cell(&self, world: f32) -> i32 {
        (world / self.cell_size).floor() as i32
    }
}

/// Two-stage sprite test: rect overlap first, then the masks at the pixel
/// offset between the two rects.
pub fn masks_overlap(a_rect: &FRect, a_mask: &Mask, b_rect: &FRect, b_mask: &Mask) -> bool {
    if !a_rect.intersects(b_rect) {
        return false;
    }
    let offset = (
        b_rect.x.floor() as i32 - a_rect.x.floor() as i32,
        b_rect.y.floor() as i32 - a_rect.y.floor() as i32,
    );
    a_mask.overlaps(b_mask, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_grid() -> CollisionGrid {
        // Floor along row 4, a wall at (5, 3).
        let mut solids: Vec<GridCell> = (0..10).map(|x| GridCell { x, y: 4 }).collect();
        solids.push(GridCell { x: 5, y: 3 });
        CollisionGrid::from_solids(64.0, 10, 6, solids)
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let mut grid = CollisionGrid::new(64.0, 2, 2);
        assert!(!grid.insert(GridCell { x: 2, y: 0 }));
        assert!(!grid.insert(GridCell { x: -1, y: 0 }));
        assert!(grid.insert(GridCell { x: 1, y: 1 }));
        assert!(grid.is_solid(1, 1));
        assert!(!grid.is_solid(5, 5));
    }

    #[test]
    fn falling_hitbox_snaps_bottom_to_tile_top() {
        let grid = floor_grid();
        let mut hitbox = FRect::new(70.0, 200.0, 30.0, 64.0);
        let side = grid.resolve_axis(&mut hitbox, Axis::Vertical, 500.0);
        assert_eq!(side, Some(Side::Bottom));
        assert_eq!(hitbox.bottom(), 256.0);
        assert_eq!(hitbox.x, 70.0);
        assert_eq!(hitbox.w, 30.0);
    }

    #[test]
    fn moving_right_snaps_right_edge_to_wall_left() {
        let grid = floor_grid();
        let mut hitbox = FRect::new(300.0, 192.0, 30.0, 64.0);
        let side = grid.resolve_axis(&mut hitbox, Axis::Horizontal, 400.0);
        assert_eq!(side, Some(Side::Right));
        assert_eq!(hitbox.right(), 320.0);
        assert_eq!(hitbox.y, 192.0);
        assert_eq!(hitbox.h, 64.0);
        // Standing flush on the floor row is not an overlap.
        assert!(grid.solid_rects(&hitbox).is_empty());
    }

    #[test]
    fn moving_left_snaps_left_edge_to_wall_right() {
        let grid = floor_grid();
        let mut hitbox = FRect::new(370.0, 192.0, 30.0, 64.0);
        assert_eq!(
            grid.resolve_axis(&mut hitbox, Axis::Horizontal, -400.0),
            Some(Side::Left)
        );
        assert_eq!(hitbox.left(), 384.0);
        assert_eq!(hitbox.y, 192.0);
        assert_eq!(hitbox.h, 64.0);
    }

    #[test]
    fn rising_hitbox_snaps_top_to_tile_bottom() {
        let grid = floor_grid();
        let mut hitbox = FRect::new(330.0, 240.0, 30.0, 10.0);
        assert_eq!(
            grid.resolve_axis(&mut hitbox, Axis::Vertical, -900.0),
            Some(Side::Top)
        );
        assert_eq!(hitbox.top(), 256.0);
        assert_eq!(hitbox.x, 330.0);
        assert_eq!(hitbox.w, 30.0);
    }

    #[test]
    fn no_overlap_means_no_contact() {
        let grid = floor_grid();
        let mut hitbox = FRect::new(10.0, 10.0, 30.0, 64.0);
        let before = hitbox;
        assert_eq!(grid.resolve_axis(&mut hitbox, Axis::Vertical, 100.0), None);
        assert_eq!(hitbox, before);
    }

    #[test]
    fn floor_probe_detects_flush_floor_but_not_a_gap() {
        let grid = floor_grid();
        let standing = FRect::new(64.0, 192.0, 30.0, 64.0);
        assert!(grid.is_on_floor(&standing));

        let hovering = FRect::new(64.0, 191.0, 30.0, 64.0);
        assert!(!grid.is_on_floor(&hovering));
    }

    #[test]
    fn masks_need_rect_overlap_first() {
        let a = Mask::full(10, 10);
        let b = Mask::full(10, 10);
        let ra = FRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(masks_overlap(&ra, &a, &FRect::new(5.0, 5.0, 10.0, 10.0), &b));
        assert!(!masks_overlap(&ra, &a, &FRect::new(10.0, 0.0, 10.0, 10.0), &b));
    }
}
