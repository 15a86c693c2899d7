use bytemuck::{Pod, Zeroable};

/// Position-only vertex, two floats in canvas pixel space
#[derive(Copy, Clone, Debug, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 2],
}

impl Vertex {
    pub const COMPONENTS: u32 = 2;
    pub const STRIDE: u32 = std::mem::size_of::<Self>() as u32;

    pub const fn new(x: f32, y: f32) -> Self {
        Self { position: [x, y] }
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }
}

/// Primitive topology used by an indexed draw
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

impl DrawMode {
    pub const ALL: [DrawMode; 5] = [
        DrawMode::Points,
        DrawMode::Lines,
        DrawMode::LineStrip,
        DrawMode::Triangles,
        DrawMode::TriangleStrip,
    ];
}

/// Where a vertex buffer feeds into the shader
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub components: u32,
    pub stride: u32,
}

impl VertexAttribute {
    pub fn position(location: u32) -> Self {
        Self {
            location,
            components: Vertex::COMPONENTS,
            stride: Vertex::STRIDE,
        }
    }
}
