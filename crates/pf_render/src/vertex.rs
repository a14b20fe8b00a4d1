#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

/// Indices for the two triangles of one quad, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

impl SpriteVertex {
    /// Four corners of an axis-aligned quad in y-down world space, wound
    /// top-left, top-right, bottom-right, bottom-left. `flip_x` mirrors the
    /// texture horizontally without moving the quad.
    pub fn quad(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        flip_x: bool,
        color: [f32; 4],
    ) -> [SpriteVertex; 4] {
        let (u0, u1) = if flip_x { (1.0, 0.0) } else { (0.0, 1.0) };
        let right = left + width;
        let bottom = top + height;
        [
            SpriteVertex {
                position: [left, top],
                tex_coords: [u0, 0.0],
                color,
            },
            SpriteVertex {
                position: [right, top],
                tex_coords: [u1, 0.0],
                color,
            },
            SpriteVertex {
                position: [right, bottom],
                tex_coords: [u1, 1.0],
                color,
            },
            SpriteVertex {
                position: [left, bottom],
                tex_coords: [u0, 1.0],
                color,
            },
        ]
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(SpriteVertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // tex_coords
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(SpriteVertex, tex_coords) as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // color
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(SpriteVertex, color) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
