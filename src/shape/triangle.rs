use super::{ComputeGeometry, Geometry};
use crate::math::deg_to_rad;
use crate::primitives::Vertex;

/// Triangle with its apex below `center` and a flat base above it
/// (y grows downward in canvas space)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    pub center: [f32; 2],
    pub side_length: f32,
}

impl Triangle {
    const BASE_ANGLE_DEGREES: f32 = 30.0;

    pub fn new(center: [f32; 2], side_length: f32) -> Self {
        Self {
            center,
            side_length,
        }
    }

    /// Non-positive side lengths give degenerate or inverted triangles
    pub fn vertices(&self) -> [Vertex; 3] {
        let [x, y] = self.center;
        let angle = deg_to_rad(Self::BASE_ANGLE_DEGREES);
        let (sin, cos) = angle.sin_cos();
        let side = self.side_length;

        [
            Vertex::new(x, y - side / 1.5),
            Vertex::new(x - side * cos, y + side * sin),
            Vertex::new(x + side * cos, y + side * sin),
        ]
    }
}

impl ComputeGeometry for Triangle {
    fn compute_geometry(&self) -> Geometry {
        Geometry {
            vertices: self.vertices().to_vec(),
            indices: vec![0, 1, 2],
        }
    }
}
