/// Reader and writer for the plain-text OBJ subset the pipelines exchange.
///
/// The reader is tolerant: it understands `v`, `vt` and `f` and skips anything
/// else. The writer emits `v` and quad `f` lines only and rejects any other face
/// arity up front, so a failed save never leaves half a file at the target path.
use crate::error::{MeshError, Result};
use crate::mesh::{Face, Mesh, Uv, Vertex, check_face_indices};
use constants::obj_format::{
    COMMENT_PREFIX, FACE_INDEX_SEPARATOR, FACE_TAG, TEMP_FILE_SUFFIX, TEXCOORD_TAG, VERTEX_TAG,
    WRITER_FACE_ARITY,
};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read a mesh from disk.
pub fn read_obj(path: &Path) -> Result<Mesh> {
    let file = File::open(path)?;
    let mesh = parse_obj(BufReader::new(file))?;
    debug!(
        "Parsed {}: {} vertices, {} faces, {} uvs",
        path.display(),
        mesh.vertices.len(),
        mesh.faces.len(),
        mesh.uvs.len()
    );
    Ok(mesh)
}

/// Parse vertices, texture coordinates and faces in file order.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut mesh = Mesh::default();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_idx + 1;
        let mut tokens = line.split_whitespace();

        let Some(tag) = tokens.next() else {
            continue;
        };
        if tag.starts_with(COMMENT_PREFIX) {
            continue;
        }

        match tag {
            VERTEX_TAG => {
                let [x, y, z] = parse_reals::<3>(&mut tokens, line_number, "vertex")?;
                mesh.vertices.push(Vertex::new(x, y, z));
            }
            TEXCOORD_TAG => {
                let [u, v] = parse_reals::<2>(&mut tokens, line_number, "texture coordinate")?;
                mesh.uvs.push(Uv::new(u, v));
            }
            FACE_TAG => {
                let indices = tokens
                    .map(|token| parse_face_index(token, line_number))
                    .collect::<Result<Vec<usize>>>()?;
                if indices.is_empty() {
                    return Err(MeshError::MalformedInput {
                        line: line_number,
                        reason: "face has no vertex indices".to_string(),
                    });
                }
                mesh.faces.push(Face::from_indices(indices));
            }
            _ => {}
        }
    }

    Ok(mesh)
}

fn parse_reals<'a, const N: usize>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    what: &str,
) -> Result<[f64; N]> {
    let mut values = [0.0; N];
    for (slot, value) in values.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| MeshError::MalformedInput {
            line,
            reason: format!("{} needs {} components, found {}", what, N, slot),
        })?;
        *value = token.parse().map_err(|_| MeshError::MalformedInput {
            line,
            reason: format!("'{}' is not a number", token),
        })?;
    }
    Ok(values)
}

/// `7`, `7/3`, `7//2` and `7/3/2` all name vertex 7 (1-based).
fn parse_face_index(token: &str, line: usize) -> Result<usize> {
    let vertex = token.split(FACE_INDEX_SEPARATOR).next().unwrap_or_default();
    let index: usize = vertex.parse().map_err(|_| MeshError::MalformedInput {
        line,
        reason: format!("'{}' is not a vertex index", token),
    })?;
    index.checked_sub(1).ok_or_else(|| MeshError::MalformedInput {
        line,
        reason: "vertex indices start at 1".to_string(),
    })
}

/// Write a quad mesh to `path` via a temporary sibling file that is renamed
/// into place once everything has been flushed.
pub fn write_obj(path: &Path, mesh: &Mesh) -> Result<()> {
    check_writable(mesh)?;

    let temp_path = temp_path_for(path);
    let result = write_to_path(&temp_path, mesh)
        .and_then(|_| fs::rename(&temp_path, path).map_err(MeshError::from));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_to_path(path: &Path, mesh: &Mesh) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_obj_to(&mut writer, mesh)?;
    writer.flush()?;
    Ok(())
}

/// Write `v` lines then 1-based quad `f` lines.
pub fn write_obj_to<W: Write>(writer: &mut W, mesh: &Mesh) -> Result<()> {
    check_writable(mesh)?;

    for v in &mesh.vertices {
        writeln!(writer, "{} {} {} {}", VERTEX_TAG, v.x, v.y, v.z)?;
    }
    for face in &mesh.faces {
        if let Face::Quad([a, b, c, d]) = face {
            writeln!(writer, "{} {} {} {} {}", FACE_TAG, a + 1, b + 1, c + 1, d + 1)?;
        }
    }
    Ok(())
}

/// Every face must be a quad with in-range indices.
fn check_writable(mesh: &Mesh) -> Result<()> {
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if face.arity() != WRITER_FACE_ARITY || !matches!(face, Face::Quad(_)) {
            return Err(MeshError::UnsupportedFace {
                face: face_idx,
                arity: face.arity(),
            });
        }
    }
    check_face_indices(&mesh.faces, mesh.vertices.len())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(TEMP_FILE_SUFFIX);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> Mesh {
        Mesh::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(1.0, 1.0, 0.25),
                Vertex::new(0.0, 1.0, -0.125),
            ],
            vec![Face::Quad([0, 1, 2, 3])],
        )
    }

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("heightfield-mesh-obj-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_mixed_directives() {
        let source = "\
# exported cube face
mtllib cube.mtl
v 0 0 0
v 1.0 0 0
v 1 1 0

v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
f 1//1 2//1 3//1
";
        let mesh = parse_obj(source.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.uvs.len(), 4);
        assert_eq!(mesh.uvs[2], Uv::new(1.0, 1.0));
        assert_eq!(
            mesh.faces,
            vec![Face::Quad([0, 1, 2, 3]), Face::Triangle([0, 1, 2])]
        );
    }

    #[test]
    fn test_missing_component_is_malformed() {
        let err = parse_obj("v 1 2 3\nv 1 2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedInput { line: 2, .. }));

        let err = parse_obj("vt 0.5 zero\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_zero_or_bad_face_index_is_malformed() {
        let err = parse_obj("v 0 0 0\nf 0 1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedInput { line: 2, .. }));

        let err = parse_obj("f a/b c d\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedInput { line: 1, .. }));

        let err = parse_obj("f\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_writer_emits_one_based_quads() {
        let mut out = Vec::new();
        write_obj_to(&mut out, &unit_quad()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "v 0 0 0");
        assert_eq!(lines[2], "v 1 1 0.25");
        assert_eq!(lines[4], "f 1 2 3 4");
    }

    #[test]
    fn test_writer_rejects_non_quads() {
        let mut mesh = unit_quad();
        mesh.faces.push(Face::Triangle([0, 1, 2]));
        let mut out = Vec::new();
        let err = write_obj_to(&mut out, &mesh).unwrap_err();
        assert!(matches!(err, MeshError::UnsupportedFace { face: 1, arity: 3 }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_writer_rejects_out_of_range_index() {
        let mut mesh = unit_quad();
        mesh.faces.push(Face::Quad([0, 1, 2, 4]));
        let err = write_obj_to(&mut Vec::new(), &mesh).unwrap_err();
        assert!(matches!(err, MeshError::Index { face: 1, index: 4, len: 4 }));
    }

    #[test]
    fn test_round_trip_through_disk() {
        let path = scratch_path("round-trip.obj");
        let mesh = unit_quad();
        write_obj(&path, &mesh).unwrap();
        let loaded = read_obj(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.faces, mesh.faces);
        for (a, b) in loaded.vertices.iter().zip(mesh.vertices.iter()) {
            assert!(a.approx_eq(*b, 1e-12));
        }
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_failed_write_leaves_existing_file_untouched() {
        let path = scratch_path("untouched.obj");
        fs::write(&path, "v 9 9 9\n").unwrap();

        let mut mesh = unit_quad();
        mesh.faces.push(Face::Polygon(vec![0, 1, 2, 3, 0]));
        assert!(write_obj(&path, &mesh).is_err());

        let contents = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(contents, "v 9 9 9\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_temp_path_is_a_sibling() {
        let path = Path::new("/some/dir/tile.obj");
        assert_eq!(temp_path_for(path), PathBuf::from("/some/dir/tile.obj.tmp"));
    }
}
