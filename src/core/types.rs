//! Core type aliases and re-exports

pub use glam::{EulerRot, Quat, Vec3};

/// Standard Result type for the pipeline
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Convert a stored `[x, y, z]` triple into a vector.
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}
