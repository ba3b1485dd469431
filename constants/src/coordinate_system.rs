/// Rotation applied to generated tiles before saving, in degrees about X.
/// -90° stands the tile's height axis (Z) up along Y for Y-up viewers.
pub const TILE_ROTATION_X_DEGREES: f64 = -90.0;

/// Exact row-major matrix for a -90° X rotation (Y→-Z, Z→Y, X→X).
pub const ROTATE_X_NEG_90: [[f64; 3]; 3] = [
    [1.0, 0.0, 0.0],  // X = X
    [0.0, 0.0, 1.0],  // Y = Z
    [0.0, -1.0, 0.0], // Z = -Y
];

/// Tolerance used when comparing transformed coordinates.
pub const COORDINATE_EPSILON: f64 = 1e-9;
