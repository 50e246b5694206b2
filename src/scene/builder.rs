//! Final hand-off graph assembly.

use std::path::Path;

use serde::Serialize;

use crate::core::types::{Result, Vec3, vec3};
use crate::math::Aabb;

use super::adjacency::Connection;
use super::catalog::{Catalog, Category, ObjectDesign};
use super::composite::{ExpandedComposite, Expansion};
use super::config::SceneConfig;
use super::document::{Doorway, ObjectSpec};
use super::graph::{ResolvedObject, Resolution, SceneIndex};
use super::node::{Attachment, LightSpec, NodeKind, ParentRef, Rotation, SceneNode, Transform};

/// Which surface of a room a slab forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlabKind {
    Floor,
    Ceiling,
    WallFront,
    WallBack,
    WallLeft,
    WallRight,
}

impl SlabKind {
    pub fn suffix(self) -> &'static str {
        match self {
            SlabKind::Floor => "floor",
            SlabKind::Ceiling => "ceiling",
            SlabKind::WallFront => "wall_front",
            SlabKind::WallBack => "wall_back",
            SlabKind::WallLeft => "wall_left",
            SlabKind::WallRight => "wall_right",
        }
    }

    fn design_key(self) -> &'static str {
        match self {
            SlabKind::Floor => "floor",
            SlabKind::Ceiling => "ceiling",
            _ => "wall",
        }
    }
}

/// A scaled cube forming one room surface.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Slab {
    pub kind: SlabKind,
    /// World-space transform of the slab's center
    pub transform: Transform,
    pub design: ObjectDesign,
    pub bounds: Aabb,
}

/// A room with derived geometry and its doorways.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedRoom {
    pub name: String,
    pub bounds: Aabb,
    pub rotation: Vec3,
    pub slabs: Vec<Slab>,
    pub doorways: Vec<Doorway>,
}

/// Everything a rendering backend needs to build the scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SceneGraph {
    pub map: String,
    pub rooms: Vec<ResolvedRoom>,
    /// Objects and composite parts, parents before children
    pub nodes: Vec<SceneNode>,
    pub connections: Vec<Connection>,
}

impl SceneGraph {
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn room(&self, name: &str) -> Option<&ResolvedRoom> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Nodes attached to the node with the given id.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a SceneNode> + 'a {
        self.nodes
            .iter()
            .filter(move |n| matches!(&n.attachment, Attachment::Node(parent) if parent == id))
    }

    /// Write the graph as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        log::info!("Saved scene graph to {}", path.display());
        Ok(())
    }
}

/// Derives room slabs from size and position alone.
pub fn room_geometry(origin: Vec3, size: Vec3, catalog: &Catalog, config: &SceneConfig) -> Vec<Slab> {
    let t = config.slab_thickness;
    let half_cube = 50.0;
    let center = origin + size * 0.5;
    let span = size / 100.0;

    let specs = [
        (SlabKind::Floor, Vec3::new(center.x, center.y, origin.z), Vec3::new(span.x, span.y, t)),
        (SlabKind::WallFront, Vec3::new(center.x, origin.y, center.z), Vec3::new(span.x, t, span.z)),
        (SlabKind::WallBack, Vec3::new(center.x, origin.y + size.y, center.z), Vec3::new(span.x, t, span.z)),
        (SlabKind::WallLeft, Vec3::new(origin.x, center.y, center.z), Vec3::new(t, span.y, span.z)),
        (SlabKind::WallRight, Vec3::new(origin.x + size.x, center.y, center.z), Vec3::new(t, span.y, span.z)),
        (SlabKind::Ceiling, Vec3::new(center.x, center.y, origin.z + size.z), Vec3::new(span.x, span.y, t)),
    ];

    specs
        .into_iter()
        .map(|(kind, position, scale)| Slab {
            kind,
            transform: Transform::from_position_scale(position, scale),
            design: catalog.design(kind.design_key()).clone(),
            bounds: Aabb::from_center_half_extent(position, scale * half_cube),
        })
        .collect()
}

/// Assembles rooms, resolved objects and expanded composites into a
/// [`SceneGraph`].
pub struct SceneGraphBuilder<'a> {
    config: &'a SceneConfig,
    catalog: &'a Catalog,
}

impl<'a> SceneGraphBuilder<'a> {
    pub fn new(config: &'a SceneConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    pub fn build(
        &self,
        index: &SceneIndex<'_>,
        resolution: &Resolution,
        expansion: &Expansion,
        connections: Vec<Connection>,
    ) -> SceneGraph {
        let doc = index.document();

        let rooms: Vec<ResolvedRoom> = index
            .rooms()
            .iter()
            .map(|&id| {
                let room = index.room(id);
                let bounds = index.room_bounds(id, self.config);
                ResolvedRoom {
                    name: room.name().to_string(),
                    bounds,
                    rotation: vec3(room.rotation.unwrap_or(self.config.room_rotation)),
                    slabs: room_geometry(bounds.min, bounds.size(), self.catalog, self.config),
                    doorways: room.doorways.clone().unwrap_or_default(),
                }
            })
            .collect();

        let mut nodes = Vec::new();
        for resolved in &resolution.objects {
            let object = index.object(resolved.id);
            let attachment = match resolved.parent {
                ParentRef::World => Attachment::None,
                ParentRef::Room(room) => Attachment::Room(index.room(room).name().to_string()),
                ParentRef::Object(p) => Attachment::Node(index.object(p).id().to_string()),
            };

            match expansion.get(resolved.id) {
                Some(composite) => self.push_composite(&mut nodes, object, resolved, attachment, composite),
                None => nodes.push(self.primitive(object, resolved, attachment)),
            }
        }

        log::info!(
            "Built scene graph: {} rooms, {} nodes, {} connections",
            rooms.len(),
            nodes.len(),
            connections.len()
        );

        SceneGraph {
            map: doc.map.clone().unwrap_or_else(|| self.config.map_path.clone()),
            rooms,
            nodes,
            connections,
        }
    }

    fn primitive(&self, object: &ObjectSpec, resolved: &ResolvedObject, attachment: Attachment) -> SceneNode {
        let kind = object.kind_folded();

        let light = match (self.catalog.category(&kind), object.intensity) {
            (Category::Light, Some(intensity)) if intensity > 0.0 => {
                let drop = if self.catalog.is_ceiling_mounted(&kind) {
                    -self.config.light_offset
                } else {
                    self.config.light_offset
                };
                Some(LightSpec {
                    intensity,
                    color: object.color.map(vec3).unwrap_or(Vec3::ONE),
                    offset: Vec3::new(0.0, 0.0, drop),
                })
            }
            _ => None,
        };

        SceneNode {
            id: object.id().to_string(),
            name: object.name().to_string(),
            object_type: kind,
            kind: NodeKind::Primitive,
            design: Some(self.catalog.design_for(object)),
            local: resolved.local,
            world: resolved.world,
            attachment,
            light,
        }
    }

    /// Anchor first, then each part attached to it.
    fn push_composite(
        &self,
        nodes: &mut Vec<SceneNode>,
        object: &ObjectSpec,
        resolved: &ResolvedObject,
        attachment: Attachment,
        composite: &ExpandedComposite,
    ) {
        let anchor_id = object.id().to_string();
        nodes.push(SceneNode {
            id: anchor_id.clone(),
            name: object.name().to_string(),
            object_type: composite.template.clone(),
            kind: NodeKind::CompositeAnchor,
            design: None,
            local: resolved.local,
            world: resolved.world,
            attachment,
            light: None,
        });

        for part in &composite.parts {
            let kind = match part.light {
                Some(light) => NodeKind::Light {
                    intensity: light.intensity,
                    color: light.color,
                },
                None => NodeKind::CompositePart,
            };
            let world = Transform {
                position: resolved.world.position + part.local.position,
                rotation: Rotation::default(),
                scale: part.local.scale,
            };
            nodes.push(SceneNode {
                id: format!("{}_{}", anchor_id, part.suffix),
                name: format!("{}_{}", object.name(), part.suffix),
                object_type: composite.template.clone(),
                kind,
                design: part.design.clone(),
                local: part.local,
                world,
                attachment: Attachment::Node(anchor_id.clone()),
                light: None,
            });
        }
    }
}
