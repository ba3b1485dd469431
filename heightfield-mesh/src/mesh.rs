/// In-memory mesh: vertex positions, polygon faces and optional per-vertex UVs.
use crate::error::{MeshError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// A vertex position. Vertices have no identity beyond their index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn cross(self, other: Vertex) -> Vertex {
        Vertex::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Component-wise comparison within an absolute tolerance.
    pub fn approx_eq(self, other: Vertex, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl Add for Vertex {
    type Output = Vertex;

    fn add(self, rhs: Vertex) -> Vertex {
        Vertex::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vertex {
    fn add_assign(&mut self, rhs: Vertex) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vertex {
    type Output = Vertex;

    fn sub(self, rhs: Vertex) -> Vertex {
        Vertex::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vertex {
    type Output = Vertex;

    fn mul(self, rhs: f64) -> Vertex {
        Vertex::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Texture coordinate for the vertex with the same index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Uv {
    pub u: f64,
    pub v: f64,
}

impl Uv {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    pub fn in_unit_square(self) -> bool {
        (0.0..=1.0).contains(&self.u) && (0.0..=1.0).contains(&self.v)
    }
}

/// Polygon face holding zero-based vertex indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Face {
    Triangle([usize; 3]),
    Quad([usize; 4]),
    Polygon(Vec<usize>),
}

impl Face {
    /// Pick the tightest variant for the given index list.
    pub fn from_indices(indices: Vec<usize>) -> Self {
        match indices.len() {
            3 => Face::Triangle([indices[0], indices[1], indices[2]]),
            4 => Face::Quad([indices[0], indices[1], indices[2], indices[3]]),
            _ => Face::Polygon(indices),
        }
    }

    pub fn indices(&self) -> &[usize] {
        match self {
            Face::Triangle(indices) => indices,
            Face::Quad(indices) => indices,
            Face::Polygon(indices) => indices,
        }
    }

    pub fn arity(&self) -> usize {
        self.indices().len()
    }
}

/// Vertices, faces and UVs as loaded from disk or built by the generator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Empty when the source carried no texture coordinates.
    pub uvs: Vec<Uv>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces,
            uvs: Vec::new(),
        }
    }

    /// Check every face index against the vertex count.
    pub fn validate_indices(&self) -> Result<()> {
        check_face_indices(&self.faces, self.vertices.len())
    }

    /// Face counts keyed by arity, e.g. `{3: 12, 4: 6}`.
    pub fn face_arity_histogram(&self) -> std::collections::BTreeMap<usize, usize> {
        let mut histogram = std::collections::BTreeMap::new();
        for face in &self.faces {
            *histogram.entry(face.arity()).or_insert(0) += 1;
        }
        histogram
    }
}

/// Fail with `MeshError::Index` on the first index that is `>= len`.
pub fn check_face_indices(faces: &[Face], len: usize) -> Result<()> {
    for (face_idx, face) in faces.iter().enumerate() {
        if let Some(&index) = face.indices().iter().find(|&&index| index >= len) {
            return Err(MeshError::Index {
                face: face_idx,
                index,
                len,
            });
        }
    }
    Ok(())
}
