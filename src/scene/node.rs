//! Scene graph node types
//!
//! Arena ids, transforms, and the resolved nodes handed to the rendering backend.

use serde::Serialize;

use crate::core::types::{EulerRot, Quat, Vec3, vec3};

use super::catalog::ObjectDesign;
use super::document::ObjectSpec;

/// Index of a room in the scene document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(pub usize);

/// Index of an object in the scene document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Typed form of an object's `parent` reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentRef {
    /// Empty parent: world root
    World,
    /// Room-parent edge; a graph root subject to room-bound clamping
    Room(RoomId),
    /// Object-parent edge; position is a local offset
    Object(ObjectId),
}

/// Object orientation, as authored.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Pitch/yaw/roll-style angles in degrees, applied X then Y then Z
    Euler(Vec3),
    Quat(Quat),
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Euler(Vec3::ZERO)
    }
}

impl Rotation {
    pub fn to_quat(&self) -> Quat {
        match *self {
            Rotation::Euler(deg) => Quat::from_euler(
                EulerRot::XYZ,
                deg.x.to_radians(),
                deg.y.to_radians(),
                deg.z.to_radians(),
            ),
            Rotation::Quat(q) => q.normalize(),
        }
    }
}

/// Position, rotation and per-axis scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Rotation,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Rotation::default(),
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Identity transform (no translation, rotation, or scaling).
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a translation-only transform.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a translation + scale transform.
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            scale,
            ..Default::default()
        }
    }

    /// The object's own authored transform. Quaternion rotation wins when
    /// present; missing fields read as identity.
    pub fn of_object(object: &ObjectSpec) -> Self {
        let rotation = match (object.rotation_quat, object.rotation) {
            (Some(q), _) => Rotation::Quat(Quat::from_array(q)),
            (None, Some(r)) => Rotation::Euler(vec3(r)),
            (None, None) => Rotation::default(),
        };
        Self {
            position: object.position.map(vec3).unwrap_or(Vec3::ZERO),
            rotation,
            scale: object.scale.map(vec3).unwrap_or(Vec3::ONE),
        }
    }

    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            position: self.position + offset,
            ..*self
        }
    }
}

/// Attachment edge of a resolved node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum Attachment {
    None,
    /// Parent is a room; rooms are not attachable handles.
    Room(String),
    /// Parent is another node, by id.
    Node(String),
}

/// Point light carried by a node, offset from it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LightSpec {
    pub intensity: f32,
    pub color: Vec3,
    pub offset: Vec3,
}

/// What a resolved node spawns as.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// A single mesh primitive
    Primitive,
    /// Invisible base of an expanded composite
    CompositeAnchor,
    /// Mesh sub-part of a composite, parented to the anchor
    CompositePart,
    /// Stand-alone point light
    Light { intensity: f32, color: Vec3 },
}

/// A single resolved object in the hand-off graph.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneNode {
    pub id: String,
    pub name: String,
    pub object_type: String,
    pub kind: NodeKind,
    /// Mesh and material; `None` for anchors and lights
    pub design: Option<ObjectDesign>,
    /// Transform relative to the attachment parent
    pub local: Transform,
    /// World-space transform
    pub world: Transform,
    pub attachment: Attachment,
    /// Light that travels with this node
    pub light: Option<LightSpec>,
}
