/// JSON run report written next to a generated or displaced mesh.
use crate::bounds::MeshBounds;
use crate::displacer::DisplaceParams;
use crate::error::{MeshError, Result};
use crate::generator::TileParams;
use crate::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parameters of whichever pipeline produced the mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "pipeline", rename_all = "snake_case")]
pub enum PipelineParams {
    Generate(TileParams),
    Displace(DisplaceParams),
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshReport {
    /// Heightmap, plus the source mesh for displacement runs.
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Face counts keyed by vertex count per face.
    pub faces_by_arity: BTreeMap<usize, usize>,
    pub uv_count: usize,
    pub bounds: MeshBounds,
    pub params: PipelineParams,
}

impl MeshReport {
    pub fn new(inputs: Vec<PathBuf>, output: &Path, mesh: &Mesh, params: PipelineParams) -> Self {
        Self {
            inputs,
            output: output.to_path_buf(),
            vertex_count: mesh.vertices.len(),
            face_count: mesh.faces.len(),
            faces_by_arity: mesh.face_arity_histogram(),
            uv_count: mesh.uvs.len(),
            bounds: MeshBounds::from_vertices(&mesh.vertices),
            params,
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(MeshError::Report)?;
        fs::write(path, json)?;

        info!("Generated run report: {}", path.display());
        self.log_summary();
        Ok(())
    }

    fn log_summary(&self) {
        let (dx, dy, dz) = self.bounds.dimensions();
        info!("Report Summary:");
        info!("  Vertices: {}", self.vertex_count);
        info!("  Faces: {} {:?}", self.face_count, self.faces_by_arity);
        info!("  Extent: {:.3} x {:.3} x {:.3}", dx, dy, dz);
    }
}
