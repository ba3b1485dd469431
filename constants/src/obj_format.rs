/// Directive tags understood by the mesh reader and writer.
pub const VERTEX_TAG: &str = "v";
pub const TEXCOORD_TAG: &str = "vt";
pub const FACE_TAG: &str = "f";
pub const COMMENT_PREFIX: char = '#';

/// Separator between vertex, texture and normal indices in a face token.
pub const FACE_INDEX_SEPARATOR: char = '/';

/// Number of indices per face line the writer emits.
pub const WRITER_FACE_ARITY: usize = 4;

/// Suffix appended to the output path while a mesh is being written.
pub const TEMP_FILE_SUFFIX: &str = "tmp";
