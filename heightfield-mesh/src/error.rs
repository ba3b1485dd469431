/// Error taxonomy shared by both mesh pipelines.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode heightmap image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("malformed mesh input{}: {reason}", line_suffix(.line))]
    MalformedInput { line: usize, reason: String },

    #[error("face {face} references vertex {index}, but only {len} are available")]
    Index { face: usize, index: usize, len: usize },

    #[error("face {face} is degenerate: its first three vertices are collinear or coincident")]
    DegenerateGeometry { face: usize },

    #[error("face {face} has {arity} vertices; the writer only accepts quads")]
    UnsupportedFace { face: usize, arity: usize },

    #[error("could not read configuration: {0}")]
    Config(#[source] serde_json::Error),

    #[error("could not serialise run report: {0}")]
    Report(#[source] serde_json::Error),
}

impl MeshError {
    /// Malformed input that is not tied to a particular line of a mesh file.
    pub fn malformed(reason: impl Into<String>) -> Self {
        MeshError::MalformedInput {
            line: 0,
            reason: reason.into(),
        }
    }
}

fn line_suffix(line: &usize) -> String {
    if *line == 0 {
        String::new()
    } else {
        format!(" at line {}", line)
    }
}

pub type Result<T> = std::result::Result<T, MeshError>;
