/// Tile extent in X and Y before final scaling (arbitrary units)
pub const DEFAULT_TILE_SIZE: f64 = 100.0;

/// Height multiplier for samples, also the depth of the solid base
pub const DEFAULT_BASE_THICKNESS: f64 = 3.0;

/// Height bias added to every top vertex before final scaling
pub const DEFAULT_Z_ADD: f64 = 0.0;

/// Final width/height of the tile after scaling
pub const DEFAULT_TARGET_SIZE: f64 = 5.0;

/// Build a closed slab (top, base, walls) rather than a top surface only
pub const DEFAULT_FULL_FIELD: bool = true;

/// Heightmaps are resampled to RESOLUTION x RESOLUTION before meshing
pub const DEFAULT_RESOLUTION: u32 = 100;

/// Multiplier applied to sampled heights when displacing a mesh
pub const DEFAULT_DISPLACEMENT_SCALE: f64 = 1.0;

/// Largest value of an 8-bit luma sample, used for normalisation
pub const LUMA_MAX: f64 = 255.0;

/// Fixed-point R, G, B weights for reducing colour to luma, scaled by 2^16
/// from ITU-R 601 (0.299, 0.587, 0.114)
pub const LUMA_WEIGHTS: [u32; 3] = [19595, 38470, 7471];

/// Fractional bits of `LUMA_WEIGHTS`
pub const LUMA_SHIFT: u32 = 16;

/// Half of one luma step in fixed point, rounds to nearest
pub const LUMA_ROUNDING: u32 = 1 << (LUMA_SHIFT - 1);
