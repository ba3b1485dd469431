//! Shared defaults for heightmap tile generation and mesh displacement.
pub mod coordinate_system;
pub mod obj_format;
pub mod tile;
