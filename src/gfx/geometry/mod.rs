//! # Procedural Geometry Generation
//!
//! Every mesh in the haunted house is generated here; the scene loads no model
//! files.
//!
//! ## Supported Primitives
//!
//! - **Box**: walls, door frame and graves
//! - **Cone**: the pyramid roof
//! - **Plane**: the floor and the door
//! - **Sphere**: bushes
//!
//! ```rust
//! use haunted_house::gfx::geometry::{generate_box, generate_cone};
//!
//! let walls = generate_box(4.0, 2.5, 4.0);
//! let roof = generate_cone(3.5, 1.5, 4);
//! assert_eq!(roof.triangle_count(), 8);
//! # let _ = walls;
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Texture coordinates (u, v)
    pub tex_coords: Vec<[f32; 2]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Interleaves positions and normals into the renderer's vertex format
    pub fn to_scene_format(&self) -> (Vec<Vertex3D>, Vec<u32>) {
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
