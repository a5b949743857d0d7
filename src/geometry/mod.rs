//! Procedural geometry
//!
//! Stateless mesh generators. Each returns CPU-side [`MeshData`]; uploading
//! to the GPU is the `gpu` module's job. Nothing here shares state with
//! anything else.
//!
//! - `figure_eight` - K1P2 blade lobes, fill, outline and spokes
//! - `shapes` - sphere, ring, axis cylinder and cone, grid plane, dexel box

mod figure_eight;
mod shapes;

pub use figure_eight::{
    figure_eight, lobe_boundary, FigureEightMesh, MAX_BLADE_SEGMENTS, ORIGIN_EPSILON, SPOKE_STRIDE,
};
pub use shapes::{axis_cone, axis_cylinder, grid_plane, ring, unit_box, uv_sphere};

/// How indices are assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Every 3 indices form a triangle
    Triangles,
    /// Every 2 indices form a line segment
    Lines,
}

/// Indexed vertex positions
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
    pub primitive: Primitive,
}

impl MeshData {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            positions: Vec::new(),
            indices: Vec::new(),
            primitive,
        }
    }

    /// Append a vertex, returning its index
    pub fn push_vertex(&mut self, position: [f32; 3]) -> u16 {
        self.positions.push(position);
        (self.positions.len() - 1) as u16
    }

    /// Number of triangles or line segments
    pub fn element_count(&self) -> usize {
        match self.primitive {
            Primitive::Triangles => self.indices.len() / 3,
            Primitive::Lines => self.indices.len() / 2,
        }
    }

    /// Positions flattened for buffer upload
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
