use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic camera over a y-down world: `position` is the world point
/// drawn at the viewport centre, and larger y values appear lower on screen.
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub viewport: (u32, u32),
}

impl Camera2D {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            viewport: (viewport_width, viewport_height),
        }
    }

    /// Centre the view on `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.position = target;
    }

    /// World-space offset of the viewport's top-left corner.
    pub fn offset(&self) -> Vec2 {
        self.position - self.half_extents()
    }

    fn half_extents(&self) -> Vec2 {
        Vec2::new(
            self.viewport.0 as f32 / (2.0 * self.zoom),
            self.viewport.1 as f32 / (2.0 * self.zoom),
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        let half = self.half_extents();

        // bottom > top flips clip-space y so world y grows downwards.
        let proj = Mat4::orthographic_rh(
            self.position.x - half.x,
            self.position.x + half.x,
            self.position.y + half.y,
            self.position.y - half.y,
            -1.0,
            1.0,
        );

        CameraUniform {
            view_proj: proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(camera: &Camera2D, point: Vec2) -> Vec2 {
        let m = Mat4::from_cols_array_2d(&camera.build_uniform().view_proj);
        let clip = m * Vec4::new(point.x, point.y, 0.0, 1.0);
        Vec2::new(clip.x, clip.y)
    }

    #[test]
    fn followed_point_maps_to_clip_origin() {
        let mut camera = Camera2D::new(1280, 720);
        camera.follow(Vec2::new(500.0, 300.0));
        let clip = project(&camera, Vec2::new(500.0, 300.0));
        assert!(clip.length() < 1e-5);
    }

    #[test]
    fn larger_world_y_is_lower_on_screen() {
        let camera = Camera2D::new(1280, 720);
        let above = project(&camera, Vec2::new(0.0, -100.0));
        let below = project(&camera, Vec2::new(0.0, 100.0));
        assert!(above.y > below.y);
    }

    #[test]
    fn offset_is_top_left_of_view() {
        let mut camera = Camera2D::new(1280, 720);
        camera.follow(Vec2::new(1000.0, 400.0));
        assert_eq!(camera.offset(), Vec2::new(360.0, 40.0));
    }
}
