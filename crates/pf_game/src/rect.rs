//! Floating-point rectangle in y-down world space (top-left origin).
//!
//! Edge setters move the rectangle without resizing it, which is what both
//! collision snapping and anchor placement ("put my mid-left here") need.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.x = center.x - self.w * 0.5;
        self.y = center.y - self.h * 0.5;
    }

    pub fn mid_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.y + self.h * 0.5)
    }

    pub fn mid_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.y + self.h * 0.5)
    }

    pub fn set_mid_left(&mut self, point: Vec2) {
        self.x = point.x;
        self.y = point.y - self.h * 0.5;
    }

    pub fn set_mid_right(&mut self, point: Vec2) {
        self.x = point.x - self.w;
        self.y = point.y - self.h * 0.5;
    }

    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.left(), self.bottom())
    }

    pub fn set_bottom_left(&mut self, point: Vec2) {
        self.x = point.x;
        self.y = point.y - self.h;
    }

    /// Grow (or shrink, with negative deltas) around the centre.
    pub fn inflate(&self, dw: f32, dh: f32) -> Self {
        let w = (self.w + dw).max(0.0);
        let h = (self.h + dh).max(0.0);
        Self::from_center(self.center(), w, h)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &FRect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    #[cfg(test)]
    pub fn contains_rect(&self, other: &FRect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_setters_preserve_size() {
        let mut r = FRect::new(0.0, 0.0, 20.0, 30.0);
        r.set_right(100.0);
        assert_eq!(r.left(), 80.0);
        r.set_bottom(50.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!((r.w, r.h), (20.0, 30.0));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = FRect::new(0.0, 0.0, 10.0, 10.0);
        let b = FRect::new(10.0, 0.0, 10.0, 10.0);
        let c = FRect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&FRect::new(9.5, 9.5, 2.0, 2.0)));
    }

    #[test]
    fn inflate_keeps_center() {
        let r = FRect::new(10.0, 10.0, 40.0, 60.0);
        let hitbox = r.inflate(-10.0, 0.0);
        assert_eq!(hitbox.w, 30.0);
        assert_eq!(hitbox.h, 60.0);
        assert_eq!(hitbox.center(), r.center());
    }

    #[test]
    fn anchors_place_rect() {
        let mut r = FRect::new(0.0, 0.0, 10.0, 4.0);
        r.set_mid_left(Vec2::new(50.0, 20.0));
        assert_eq!((r.x, r.y), (50.0, 18.0));
        r.set_mid_right(Vec2::new(50.0, 20.0));
        assert_eq!((r.x, r.y), (40.0, 18.0));
        r.set_bottom_left(Vec2::new(5.0, 64.0));
        assert_eq!(r.bottom_left(), Vec2::new(5.0, 64.0));
    }

    #[test]
    fn contains_rect_is_inclusive() {
        let outer = FRect::new(0.0, 0.0, 100.0, 50.0);
        assert!(outer.contains_rect(&FRect::new(0.0, 0.0, 100.0, 50.0)));
        assert!(!outer.contains_rect(&FRect::new(-1.0, 0.0, 10.0, 10.0)));
    }
}
