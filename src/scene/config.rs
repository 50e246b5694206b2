//! Scene build configuration: fixed defaults and geometric tolerances.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;

/// Defaults and tolerances used by every pipeline stage.
///
/// Deserializes with per-field defaults, so a config file only needs the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Map identifier used when the document has none
    pub map_path: String,
    pub room_size: [f32; 3],
    pub room_position: [f32; 3],
    pub room_rotation: [f32; 3],
    pub object_position: [f32; 3],
    pub object_rotation: [f32; 3],
    pub object_scale: [f32; 3],
    /// Parent assigned to objects that name none
    pub default_parent: String,
    pub light_intensity: f32,
    pub light_color: [f32; 3],
    pub rocket_lamp_intensity: f32,
    pub rocket_lamp_color: [f32; 3],
    /// Distance kept between room-parented objects and the walls (cm)
    pub room_margin: f32,
    /// Maximum gap between two walls that still counts as shared (cm)
    pub adjacency_tolerance: f32,
    /// Minimum overlap along a shared wall for a doorway (cm)
    pub min_doorway_overlap: f32,
    /// Offsets smaller than this are not corrected by contact alignment
    pub alignment_threshold: f32,
    /// Vertical distance between a light-bearing object and its light
    pub light_offset: f32,
    /// Thickness scale of floor, ceiling and wall slabs
    pub slab_thickness: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            map_path: "/Game/BlockOutBuilder/Generated/BlockOutScene".to_string(),
            room_size: [600.0, 800.0, 350.0],
            room_position: [0.0; 3],
            room_rotation: [0.0; 3],
            object_position: [0.0; 3],
            object_rotation: [0.0; 3],
            object_scale: [1.0; 3],
            default_parent: "living_room".to_string(),
            light_intensity: 3000.0,
            light_color: [1.0, 1.0, 1.0],
            rocket_lamp_intensity: 5000.0,
            rocket_lamp_color: [1.0, 0.8, 0.6],
            room_margin: 50.0,
            adjacency_tolerance: 20.0,
            min_doorway_overlap: 100.0,
            alignment_threshold: 0.1,
            light_offset: 50.0,
            slab_thickness: 0.1,
        }
    }
}

impl SceneConfig {
    /// Load a (possibly partial) config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.room_margin, 50.0);
        assert_eq!(cfg.default_parent, "living_room");
        assert!(cfg.rocket_lamp_intensity > cfg.light_intensity);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let cfg: SceneConfig = serde_json::from_str(r#"{"room_margin": 20.0}"#).unwrap();
        assert_eq!(cfg.room_margin, 20.0);
        assert_eq!(cfg.adjacency_tolerance, 20.0);
        assert_eq!(cfg.map_path, SceneConfig::default().map_path);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_parent": "loft"}"#).unwrap();

        let cfg = SceneConfig::load(&path).unwrap();
        assert_eq!(cfg.default_parent, "loft");
    }
}
