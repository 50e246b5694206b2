//! Axis-aligned bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create AABB from center and half-extents
    pub fn from_center_half_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self {
            min: center - half_extent,
            max: center + half_extent,
        }
    }

    /// Create AABB from an origin corner and a size (room convention)
    pub fn from_origin_size(origin: Vec3, size: Vec3) -> Self {
        Self::new(origin.min(origin + size), origin.max(origin + size))
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Lowest Z of the box
    pub fn bottom(&self) -> f32 {
        self.min.z
    }

    /// Highest Z of the box
    pub fn top(&self) -> f32 {
        self.max.z
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Return the box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert_eq!(aabb.bottom(), 0.0);
        assert_eq!(aabb.top(), 1.0);
    }

    #[test]
    fn test_from_origin_size() {
        let room = Aabb::from_origin_size(Vec3::new(600.0, 0.0, 0.0), Vec3::new(500.0, 800.0, 350.0));
        assert_eq!(room.min, Vec3::new(600.0, 0.0, 0.0));
        assert_eq!(room.max, Vec3::new(1100.0, 800.0, 350.0));
    }

    #[test]
    fn test_merged_and_translated() {
        let a = Aabb::from_center_half_extent(Vec3::ZERO, Vec3::splat(1.0));
        let b = a.translated(Vec3::new(0.0, 0.0, 4.0));
        let m = a.merged(&b);
        assert_eq!(m.bottom(), -1.0);
        assert_eq!(m.top(), 5.0);
    }
}
