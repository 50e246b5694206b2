//! Scene document: the persisted, partially-specified form of a scene.
//!
//! Every field is optional on the way in. Field parsing is lenient: a value of
//! the wrong shape reads as absent and is later filled by the defaults pass.
//! The validator reports such values before they are dropped.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::types::{Result, Vec3};

use super::validate;

/// Primitive mesh shapes understood by the rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshKind {
    Cube,
    Cylinder,
    Sphere,
    Plane,
}

impl MeshKind {
    /// Half-extent of the unscaled primitive (engine primitives are 100 units across).
    pub fn half_extent(self) -> Vec3 {
        match self {
            MeshKind::Plane => Vec3::new(50.0, 50.0, 0.0),
            MeshKind::Cube | MeshKind::Cylinder | MeshKind::Sphere => Vec3::splat(50.0),
        }
    }

    /// Engine asset reference for this primitive.
    pub fn asset_path(self) -> &'static str {
        match self {
            MeshKind::Cube => "/Engine/BasicShapes/Cube.Cube",
            MeshKind::Cylinder => "/Engine/BasicShapes/Cylinder.Cylinder",
            MeshKind::Sphere => "/Engine/BasicShapes/Sphere.Sphere",
            MeshKind::Plane => "/Engine/BasicShapes/Plane.Plane",
        }
    }
}

/// Surface materials understood by the rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Wood,
    Metal,
    Fabric,
    Glass,
    Plastic,
    Default,
    Floor,
    Wall,
}

impl MaterialKind {
    /// Engine asset reference for this material.
    pub fn asset_path(self) -> &'static str {
        match self {
            MaterialKind::Floor => "/Engine/EngineMaterials/WorldGridMaterial.WorldGridMaterial",
            _ => "/Engine/EngineMaterials/DefaultMaterial.DefaultMaterial",
        }
    }
}

/// A link from one room to an adjacent room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doorway {
    #[serde(rename = "type", default = "default_doorway_kind")]
    pub kind: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Name of the room on the other side. Lookup only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connects_to: Option<String>,
}

fn default_doorway_kind() -> String {
    "doorway".to_string()
}

/// A room as authored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Width, depth, height in cm.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub size: Option<[f32; 3]>,
    /// World-space origin corner.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    /// Malformed entries are dropped one by one; the rest are kept.
    #[serde(default, deserialize_with = "lenient_items", skip_serializing_if = "Option::is_none")]
    pub doorways: Option<Vec<Doorway>>,
}

impl RoomSpec {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// An object as authored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Offset in the parent's frame (world-space for room parents).
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    /// Euler angles in degrees. Mutually exclusive with `rotation_quat`.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    /// Quaternion `[x, y, z, w]`. An explicit null reads as absent.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rotation_quat: Option<[f32; 4]>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
    /// Room name or object id; empty means world root.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub mesh_type: Option<MeshKind>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub material_type: Option<MaterialKind>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
}

impl ObjectSpec {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Case-folded type tag, empty when untyped.
    pub fn kind_folded(&self) -> String {
        self.kind.as_deref().unwrap_or_default().to_lowercase()
    }
}

/// Top-level scene document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub rooms: Vec<RoomSpec>,
    #[serde(deserialize_with = "lenient_seq")]
    pub objects: Vec<ObjectSpec>,
}

impl SceneDocument {
    /// Convert a raw value after the strict top-level check.
    pub fn from_value(raw: Value) -> Result<Self> {
        validate::validate_strict(&raw)?;
        Ok(serde_json::from_value(raw)?)
    }

    /// Load and convert a scene document file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_value(read_raw(path)?)
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Read a file as an untyped JSON value (the untrusted input form).
pub fn read_raw(path: &Path) -> Result<Value> {
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    log::info!("Loaded scene file: {}", path.display());
    Ok(value)
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_items<'de, D, T>(deserializer: D) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}
