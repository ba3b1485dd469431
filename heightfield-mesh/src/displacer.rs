/// Displace an existing mesh along its face normals by a heightmap sampled
/// through each vertex's UV coordinate.
use crate::error::{MeshError, Result};
use crate::geometry::face_normal;
use crate::heightmap::Heightmap;
use crate::mesh::{Mesh, Vertex, check_face_indices};
use crate::obj::{read_obj, write_obj};
use crate::progress::{Progress, ProgressEvent};
use constants::tile::DEFAULT_DISPLACEMENT_SCALE;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// How contributions from several faces sharing a vertex are combined.
///
/// Every face incident to a vertex produces one contribution
/// `normal * height * scale`. `Accumulate` adds all of them, so a vertex on
/// four quads moves four times as far as an isolated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplacementStrategy {
    #[default]
    Accumulate,
    /// Keep only the contribution of the last incident face in file order.
    LastWrite,
    /// Mean of the incident faces' contributions.
    Average,
}

impl FromStr for DisplacementStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "accumulate" => Ok(DisplacementStrategy::Accumulate),
            "last-write" => Ok(DisplacementStrategy::LastWrite),
            "average" => Ok(DisplacementStrategy::Average),
            other => Err(format!(
                "unknown strategy '{}', expected accumulate, last-write or average",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaceParams {
    pub displacement_scale: f64,
    pub strategy: DisplacementStrategy,
}

impl Default for DisplaceParams {
    fn default() -> Self {
        Self {
            displacement_scale: DEFAULT_DISPLACEMENT_SCALE,
            strategy: DisplacementStrategy::default(),
        }
    }
}

/// Displaced copy of `mesh.vertices`. The input mesh is left untouched.
pub fn displace(
    mesh: &Mesh,
    heightmap: &Heightmap,
    params: &DisplaceParams,
    progress: &dyn Progress,
) -> Result<Vec<Vertex>> {
    validate(mesh)?;
    let normals = compute_normals(mesh)?;
    progress.stage(ProgressEvent::NormalsComputed {
        count: normals.len(),
    });

    let out_of_range = mesh.uvs.iter().filter(|uv| !uv.in_unit_square()).count();
    if out_of_range > 0 {
        warn!(
            "{} UV coordinates fall outside [0, 1] and will be clamped",
            out_of_range
        );
    }

    let mut displaced = mesh.vertices.clone();
    let mut sums = vec![Vertex::default(); mesh.vertices.len()];
    let mut counts = vec![0u32; mesh.vertices.len()];

    progress.begin(mesh.faces.len() as u64, "Displacing vertices");
    for (face, normal) in mesh.faces.iter().zip(normals.iter()) {
        for &i in face.indices() {
            let uv = mesh.uvs[i];
            let height = heightmap.sample_uv(uv.u, uv.v);
            let contribution = *normal * height * params.displacement_scale;

            match params.strategy {
                DisplacementStrategy::Accumulate => displaced[i] += contribution,
                DisplacementStrategy::LastWrite => displaced[i] = mesh.vertices[i] + contribution,
                DisplacementStrategy::Average => {
                    sums[i] += contribution;
                    counts[i] += 1;
                }
            }
        }
        progress.advance(1);
    }
    progress.finish("Vertices displaced");

    if params.strategy == DisplacementStrategy::Average {
        for ((vertex, sum), &count) in displaced.iter_mut().zip(&sums).zip(&counts) {
            if count > 0 {
                *vertex += *sum * (1.0 / count as f64);
            }
        }
    }

    progress.stage(ProgressEvent::Displaced {
        vertices: displaced.len(),
    });
    Ok(displaced)
}

/// Indices must address both vertices and UVs, which must pair up one-to-one.
fn validate(mesh: &Mesh) -> Result<()> {
    check_face_indices(&mesh.faces, mesh.vertices.len())?;
    check_face_indices(&mesh.faces, mesh.uvs.len())?;

    if mesh.uvs.len() != mesh.vertices.len() {
        return Err(MeshError::malformed(format!(
            "mesh has {} vertices but {} texture coordinates",
            mesh.vertices.len(),
            mesh.uvs.len()
        )));
    }

    if let Some((face_idx, face)) = mesh
        .faces
        .iter()
        .enumerate()
        .find(|(_, face)| face.arity() < 3)
    {
        return Err(MeshError::malformed(format!(
            "face {} has {} vertices, at least 3 are needed for a normal",
            face_idx,
            face.arity()
        )));
    }

    Ok(())
}

/// Unit normal per face from its first three vertices.
fn compute_normals(mesh: &Mesh) -> Result<Vec<Vertex>> {
    let normals: Vec<Option<Vertex>> = mesh
        .faces
        .par_iter()
        .map(|face| {
            let idx = face.indices();
            face_normal(
                mesh.vertices[idx[0]],
                mesh.vertices[idx[1]],
                mesh.vertices[idx[2]],
            )
        })
        .collect();

    normals
        .into_iter()
        .enumerate()
        .map(|(face, normal)| normal.ok_or(MeshError::DegenerateGeometry { face }))
        .collect()
}

/// Load a UV-mapped mesh, displace it by the heightmap and save the result.
/// Returns the saved mesh.
pub fn apply_heightfield(
    mesh_path: &Path,
    heightmap_path: &Path,
    output_path: &Path,
    params: &DisplaceParams,
    progress: &dyn Progress,
) -> Result<Mesh> {
    let mesh = read_obj(mesh_path)?;
    progress.stage(ProgressEvent::MeshLoaded {
        path: mesh_path.to_path_buf(),
        vertices: mesh.vertices.len(),
        faces: mesh.faces.len(),
        uvs: mesh.uvs.len(),
    });

    let heightmap = Heightmap::load(heightmap_path, None)?;
    progress.stage(ProgressEvent::HeightmapLoaded {
        path: heightmap_path.to_path_buf(),
        width: heightmap.width(),
        height: heightmap.height(),
    });
    debug!("Displacing with {:?}", params);

    let vertices = displace(&mesh, &heightmap, params, progress)?;
    let displaced = Mesh {
        vertices,
        faces: mesh.faces,
        uvs: mesh.uvs,
    };

    write_obj(output_path, &displaced)?;
    progress.stage(ProgressEvent::Saved {
        path: output_path.to_path_buf(),
    });

    Ok(displaced)
}
