/// Axis-aligned bounds of a vertex set
use crate::mesh::Vertex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const BOUNDS_CHUNK_SIZE: usize = 25_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl MeshBounds {
    /// Create new bounds initialised to infinity values
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
            min_z: f64::INFINITY,
            max_z: f64::NEG_INFINITY,
        }
    }

    /// Bounds of all vertices, reduced over parallel chunks.
    /// An empty slice yields the infinite "empty" bounds.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        vertices
            .par_chunks(BOUNDS_CHUNK_SIZE)
            .map(|chunk| {
                let mut local_bounds = MeshBounds::new();
                for vertex in chunk {
                    local_bounds.update(vertex);
                }
                local_bounds
            })
            .reduce_with(MeshBounds::merge)
            .unwrap_or_else(MeshBounds::new)
    }

    /// Update bounds with a new vertex
    pub fn update(&mut self, vertex: &Vertex) {
        self.min_x = self.min_x.min(vertex.x);
        self.max_x = self.max_x.max(vertex.x);
        self.min_y = self.min_y.min(vertex.y);
        self.max_y = self.max_y.max(vertex.y);
        self.min_z = self.min_z.min(vertex.z);
        self.max_z = self.max_z.max(vertex.z);
    }

    fn merge(mut self, other: MeshBounds) -> MeshBounds {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
        self.min_z = self.min_z.min(other.min_z);
        self.max_z = self.max_z.max(other.max_z);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    /// World space extent along each axis
    pub fn dimensions(&self) -> (f64, f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        (
            self.max_x - self.min_x,
            self.max_y - self.min_y,
            self.max_z - self.min_z,
        )
    }
}

impl Default for MeshBounds {
    fn default() -> Self {
        Self::new()
    }
}
