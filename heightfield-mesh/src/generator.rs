/// Heightmap tile generation: a grid of top-surface vertices displaced by the
/// sampled heights, optionally closed into a solid slab with base and walls.
use crate::error::{MeshError, Result};
use crate::geometry::{rotate_x, scale_uniform};
use crate::heightmap::Heightmap;
use crate::mesh::{Face, Mesh, Vertex};
use crate::obj::write_obj;
use crate::progress::{Progress, ProgressEvent};
use constants::coordinate_system::TILE_ROTATION_X_DEGREES;
use constants::tile::{
    DEFAULT_BASE_THICKNESS, DEFAULT_FULL_FIELD, DEFAULT_RESOLUTION, DEFAULT_TARGET_SIZE,
    DEFAULT_TILE_SIZE, DEFAULT_Z_ADD,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Parameters controlling tile generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileParams {
    /// Tile extent in X and Y before final scaling.
    pub tile_size: f64,
    /// Height multiplier for samples and depth of the solid base.
    pub base_thickness: f64,
    /// Added to every top vertex height before the final scale, so it is
    /// scaled along with everything else.
    pub z_add: f64,
    /// Final width of the tile.
    pub target_size: f64,
    /// Closed slab (top, base, walls, bottom) instead of the top surface only.
    pub full_field: bool,
    /// Resample the heightmap to `resolution x resolution` before meshing.
    pub resolution: Option<u32>,
    /// Rotation about X applied after scaling.
    pub rotate_x_degrees: Option<f64>,
}

impl Default for TileParams {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            base_thickness: DEFAULT_BASE_THICKNESS,
            z_add: DEFAULT_Z_ADD,
            target_size: DEFAULT_TARGET_SIZE,
            full_field: DEFAULT_FULL_FIELD,
            resolution: Some(DEFAULT_RESOLUTION),
            rotate_x_degrees: Some(TILE_ROTATION_X_DEGREES),
        }
    }
}

impl TileParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(MeshError::InvalidInput(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.target_size.is_finite() && self.target_size > 0.0) {
            return Err(MeshError::InvalidInput(format!(
                "target_size must be positive, got {}",
                self.target_size
            )));
        }
        if !self.base_thickness.is_finite() || !self.z_add.is_finite() {
            return Err(MeshError::InvalidInput(
                "base_thickness and z_add must be finite".to_string(),
            ));
        }
        if self.resolution == Some(0) {
            return Err(MeshError::InvalidInput(
                "resolution must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Uniform factor that fits the tile into `target_size`.
    pub fn scale_factor(&self) -> f64 {
        let max_dimension = self.tile_size.max(self.tile_size);
        self.target_size / max_dimension
    }
}

/// Builds tile meshes from height grids.
pub struct TileGenerator {
    params: TileParams,
}

impl TileGenerator {
    pub fn new(params: TileParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TileParams {
        &self.params
    }

    /// Build the complete, scaled and rotated tile for `heightmap`.
    pub fn generate(&self, heightmap: &Heightmap, progress: &dyn Progress) -> Mesh {
        let (w, h) = (heightmap.width(), heightmap.height());
        debug!("Generating tile from {}x{} grid with {:?}", w, h, self.params);

        let mut vertices = self.build_vertices(heightmap);
        progress.stage(ProgressEvent::VerticesBuilt {
            count: vertices.len(),
        });

        let mut faces = self.build_top_faces(w, h, progress);
        if self.params.full_field {
            self.append_side_faces(&mut faces, w, h);
            faces.push(bottom_quad(vertices.len()));
        }
        progress.stage(ProgressEvent::FacesBuilt { count: faces.len() });

        let factor = self.params.scale_factor();
        scale_uniform(&mut vertices, factor);
        progress.stage(ProgressEvent::Scaled { factor });

        if let Some(degrees) = self.params.rotate_x_degrees {
            rotate_x(&mut vertices, degrees);
            progress.stage(ProgressEvent::Rotated { degrees });
        }

        Mesh::new(vertices, faces)
    }

    /// Top grid (index `y*w + x`), then for solid tiles the base grid
    /// (offset `h*w`) and the four bottom corners.
    fn build_vertices(&self, heightmap: &Heightmap) -> Vec<Vertex> {
        let params = &self.params;
        let (w, h) = (heightmap.width(), heightmap.height());
        let scale_x = params.tile_size / w as f64;
        let scale_y = params.tile_size / h as f64;

        let capacity = if params.full_field { 2 * w * h + 4 } else { w * h };
        let mut vertices = Vec::with_capacity(capacity);

        for y in 0..h {
            for x in 0..w {
                let z = heightmap.sample(x, y) * params.base_thickness + params.z_add;
                vertices.push(Vertex::new(x as f64 * scale_x, y as f64 * scale_y, z));
            }
        }

        if params.full_field {
            let base_z = -params.base_thickness;
            for y in 0..h {
                for x in 0..w {
                    vertices.push(Vertex::new(x as f64 * scale_x, y as f64 * scale_y, base_z));
                }
            }

            let tile = params.tile_size;
            vertices.extend_from_slice(&[
                Vertex::new(0.0, 0.0, base_z),
                Vertex::new(tile, 0.0, base_z),
                Vertex::new(tile, tile, base_z),
                Vertex::new(0.0, tile, base_z),
            ]);
        }

        vertices
    }

    /// One quad per 2x2 neighbourhood of the top grid.
    fn build_top_faces(&self, w: usize, h: usize, progress: &dyn Progress) -> Vec<Face> {
        let rows = h.saturating_sub(1);
        let cols = w.saturating_sub(1);
        let mut faces = Vec::with_capacity(rows * cols);

        progress.begin(rows as u64, "Generating top quads");
        for y in 0..rows {
            for x in 0..cols {
                let i = y * w + x;
                faces.push(Face::Quad([i, i + 1, i + w + 1, i + w]));
            }
            progress.advance(1);
        }
        progress.finish("Top quads generated");

        faces
    }

    /// Walls along the four grid boundaries, linking each top-edge segment to
    /// the matching base segment.
    fn append_side_faces(&self, faces: &mut Vec<Face>, w: usize, h: usize) {
        let base_offset = h * w;

        for y in 0..h.saturating_sub(1) {
            for x in 0..w.saturating_sub(1) {
                let i = y * w + x;
                let base_i = i + base_offset;

                // Front
                if y == 0 {
                    faces.push(Face::Quad([i, i + 1, base_i + 1, base_i]));
                }
                // Back
                if y == h - 2 {
                    faces.push(Face::Quad([i + w, i + w + 1, base_i + w + 1, base_i + w]));
                }
                // Left
                if x == 0 {
                    faces.push(Face::Quad([i, i + w, base_i + w, base_i]));
                }
                // Right
                if x == w - 2 {
                    faces.push(Face::Quad([i + 1, i + w + 1, base_i + w + 1, base_i + 1]));
                }
            }
        }
    }
}

/// Bottom face over the four trailing corner vertices, in construction order:
/// bottom-left, bottom-right, top-right, top-left.
fn bottom_quad(vertex_count: usize) -> Face {
    Face::Quad([
        vertex_count - 4,
        vertex_count - 3,
        vertex_count - 2,
        vertex_count - 1,
    ])
}

/// Load a heightmap, build the tile and save it. Returns the saved mesh.
pub fn generate_tile(
    heightmap_path: &Path,
    output_path: &Path,
    params: &TileParams,
    progress: &dyn Progress,
) -> Result<Mesh> {
    let generator = TileGenerator::new(params.clone())?;

    let heightmap = Heightmap::load(heightmap_path, params.resolution)?;
    progress.stage(ProgressEvent::HeightmapLoaded {
        path: heightmap_path.to_path_buf(),
        width: heightmap.width(),
        height: heightmap.height(),
    });
    if let Some(resolution) = params.resolution {
        progress.stage(ProgressEvent::Downsampled { resolution });
    }
    debug!("Height sample range: {:?}", heightmap.min_max());

    let mesh = generator.generate(&heightmap, progress);

    write_obj(output_path, &mesh)?;
    progress.stage(ProgressEvent::Saved {
        path: output_path.to_path_buf(),
    });

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, RecordingProgress};
    use constants::coordinate_system::COORDINATE_EPSILON;

    fn flat_params(full_field: bool) -> TileParams {
        TileParams {
            tile_size: 2.0,
            base_thickness: 1.0,
            z_add: 0.0,
            target_size: 1.0,
            full_field,
            resolution: None,
            rotate_x_degrees: None,
        }
    }

    fn grid(w: usize, h: usize) -> Heightmap {
        let samples = (0..w * h).map(|i| (i % 7) as f64 / 7.0).collect();
        Heightmap::from_samples(w, h, samples).unwrap()
    }

    fn generate(params: TileParams, heightmap: &Heightmap) -> Mesh {
        TileGenerator::new(params)
            .unwrap()
            .generate(heightmap, &NoProgress)
    }

    #[test]
    fn test_checkerboard_example() {
        let heightmap = Heightmap::from_samples(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let mesh = generate(flat_params(false), &heightmap);

        // (0,0,0) (1,0,1) (0,1,1) (1,1,0) before the 0.5 scale
        assert_eq!(
            mesh.vertices,
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(0.5, 0.0, 0.5),
                Vertex::new(0.0, 0.5, 0.5),
                Vertex::new(0.5, 0.5, 0.0),
            ]
        );
        assert_eq!(mesh.faces, vec![Face::Quad([0, 1, 3, 2])]);
    }

    #[test]
    fn test_counts_top_only() {
        for (w, h) in [(2, 2), (3, 5), (8, 4)] {
            let mesh = generate(flat_params(false), &grid(w, h));
            assert_eq!(mesh.vertices.len(), w * h);
            assert_eq!(mesh.faces.len(), (w - 1) * (h - 1));
        }
    }

    #[test]
    fn test_counts_full_solid() {
        for (w, h) in [(2, 2), (3, 5), (8, 4)] {
            let mesh = generate(flat_params(true), &grid(w, h));
            assert_eq!(mesh.vertices.len(), 2 * w * h + 4);

            let top = (w - 1) * (h - 1);
            let walls = 2 * (w - 1) + 2 * (h - 1);
            assert_eq!(mesh.faces.len(), top + walls + 1);
            assert!(mesh.validate_indices().is_ok());
            assert!(mesh.faces.iter().all(|face| matches!(face, Face::Quad(_))));
        }
    }

    #[test]
    fn test_solid_layout_and_bottom_quad() {
        let params = flat_params(true);
        let heightmap = grid(3, 2);
        let mesh = generate(params.clone(), &heightmap);
        let n = mesh.vertices.len();

        // base layer sits at -base_thickness, scaled by 0.5
        for vertex in &mesh.vertices[6..n] {
            assert_eq!(vertex.z, -0.5);
        }
        // corners span the full tile, not the last grid column
        assert_eq!(mesh.vertices[n - 3], Vertex::new(1.0, 0.0, -0.5));
        assert_eq!(mesh.vertices[n - 2], Vertex::new(1.0, 1.0, -0.5));
        assert_eq!(
            mesh.faces.last(),
            Some(&Face::Quad([n - 4, n - 3, n - 2, n - 1]))
        );
    }

    #[test]
    fn test_side_wall_order_for_two_by_two() {
        let mesh = generate(flat_params(true), &grid(2, 2));
        // single cell: front, back, left, right, then bottom
        assert_eq!(
            mesh.faces,
            vec![
                Face::Quad([0, 1, 3, 2]),
                Face::Quad([0, 1, 5, 4]),
                Face::Quad([2, 3, 7, 6]),
                Face::Quad([0, 2, 6, 4]),
                Face::Quad([1, 3, 7, 5]),
                Face::Quad([8, 9, 10, 11]),
            ]
        );
    }

    #[test]
    fn test_z_add_is_scaled_with_heights() {
        let mut params = flat_params(false);
        params.z_add = 4.0;
        let heightmap = Heightmap::from_samples(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let mesh = generate(params, &heightmap);
        assert_eq!(mesh.vertices[0].z, 2.0);
        assert_eq!(mesh.vertices[1].z, 2.5);
    }

    #[test]
    fn test_rotation_is_applied_after_scaling() {
        let mut params = flat_params(false);
        params.rotate_x_degrees = Some(-90.0);
        let heightmap = Heightmap::from_samples(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let mesh = generate(params, &heightmap);
        // (0.5, 0.0, 0.5) -> (0.5, 0.5, -0.0); (0.0, 0.5, 0.5) -> (0.0, 0.5, -0.5)
        assert!(mesh.vertices[1].approx_eq(Vertex::new(0.5, 0.5, 0.0), COORDINATE_EPSILON));
        assert!(mesh.vertices[2].approx_eq(Vertex::new(0.0, 0.5, -0.5), COORDINATE_EPSILON));
    }

    #[test]
    fn test_scaling_leaves_topology_alone() {
        let heightmap = grid(4, 3);
        let reference = generate(flat_params(true), &heightmap);

        let mut params = flat_params(true);
        params.target_size = 6.0;
        let scaled = generate(params, &heightmap);

        assert_eq!(scaled.faces, reference.faces);
        for (a, b) in scaled.vertices.iter().zip(reference.vertices.iter()) {
            assert!(a.approx_eq(*b * 6.0, COORDINATE_EPSILON));
        }
    }

    #[test]
    fn test_degenerate_grids_have_no_top_faces() {
        for (w, h) in [(1, 1), (1, 6), (5, 1)] {
            let mesh = generate(flat_params(false), &grid(w, h));
            assert_eq!(mesh.vertices.len(), w * h);
            assert!(mesh.faces.is_empty());
        }

        let mesh = generate(flat_params(true), &grid(1, 4));
        assert_eq!(mesh.vertices.len(), 2 * 4 + 4);
        assert_eq!(mesh.faces.len(), 1);
        assert!(mesh.validate_indices().is_ok());
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let mut params = flat_params(false);
        params.tile_size = 0.0;
        assert!(matches!(
            TileGenerator::new(params),
            Err(MeshError::InvalidInput(_))
        ));

        let mut params = flat_params(false);
        params.target_size = -1.0;
        assert!(matches!(
            TileGenerator::new(params),
            Err(MeshError::InvalidInput(_))
        ));

        let mut params = flat_params(false);
        params.resolution = Some(0);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_stage_sequence() {
        let progress = RecordingProgress::new();
        let mut params = flat_params(true);
        params.rotate_x_degrees = Some(-90.0);
        TileGenerator::new(params)
            .unwrap()
            .generate(&grid(3, 3), &progress);

        assert_eq!(
            progress.events(),
            vec![
                ProgressEvent::VerticesBuilt { count: 22 },
                ProgressEvent::FacesBuilt { count: 13 },
                ProgressEvent::Scaled { factor: 0.5 },
                ProgressEvent::Rotated { degrees: -90.0 },
            ]
        );
        assert_eq!(progress.ticks(), 2);
    }

    #[test]
    fn test_params_from_partial_json() {
        let params: TileParams =
            serde_json::from_str(r#"{ "tile_size": 50.0, "full_field": false }"#).unwrap();
        assert_eq!(params.tile_size, 50.0);
        assert!(!params.full_field);
        assert_eq!(params.target_size, DEFAULT_TARGET_SIZE);
        assert_eq!(params.resolution, Some(DEFAULT_RESOLUTION));
    }
}
