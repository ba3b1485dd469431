//! Heightmap-driven mesh generation and displacement.
//!
//! Two pipelines share the OBJ reader/writer and heightmap sampling:
//! [`generator::generate_tile`] builds a tile mesh from a grayscale image, and
//! [`displacer::apply_heightfield`] pushes an existing UV-mapped mesh along its
//! face normals by the heightmap.
pub mod bounds;
pub mod config;
pub mod displacer;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod heightmap;
pub mod mesh;
pub mod obj;
pub mod progress;
pub mod report;

pub use displacer::{DisplaceParams, DisplacementStrategy, apply_heightfield, displace};
pub use error::{MeshError, Result};
pub use generator::{TileGenerator, TileParams, generate_tile};
pub use heightmap::Heightmap;
pub use mesh::{Face, Mesh, Uv, Vertex};
