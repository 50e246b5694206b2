//! Object-type catalog: type categories, floor-snap heights, design tables
//! and composite templates.
//!
//! The catalog is plain data handed to each stage. `Catalog::default()` is the
//! built-in interior catalog; a different furniture set is just another value.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::types::Vec3;

use super::document::{MaterialKind, MeshKind, ObjectSpec};

/// Broad classification that drives type-specific defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Light,
    Furniture,
    Generic,
}

/// Resolved mesh/material pair for an object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectDesign {
    pub mesh: MeshKind,
    pub material: MaterialKind,
    pub description: String,
}

impl ObjectDesign {
    pub fn new(mesh: MeshKind, material: MaterialKind, description: impl Into<String>) -> Self {
        Self {
            mesh,
            material,
            description: description.into(),
        }
    }
}

/// Parameters of the staged rocket lamp.
#[derive(Clone, Debug, PartialEq)]
pub struct RocketLampParams {
    pub body_scale: Vec3,
    pub nose_scale: Vec3,
    pub fin_scale: Vec3,
    /// Half-height of the unscaled cylinder/cube primitive
    pub primitive_half_height: f32,
    /// Radial distance of the fins from the lamp axis
    pub fin_radius: f32,
    /// Height of the light above the body top
    pub light_clearance: f32,
    pub material: MaterialKind,
}

impl Default for RocketLampParams {
    fn default() -> Self {
        Self {
            body_scale: Vec3::new(0.3, 0.3, 0.8),
            nose_scale: Vec3::new(0.2, 0.2, 0.3),
            fin_scale: Vec3::new(0.1, 0.1, 0.2),
            primitive_half_height: 50.0,
            fin_radius: 15.0,
            light_clearance: 50.0,
            material: MaterialKind::Metal,
        }
    }
}

/// Procedural assemblies known to the expander.
#[derive(Clone, Debug, PartialEq)]
pub enum CompositeKind {
    RocketLamp(RocketLampParams),
}

/// A type that expands into several primitives instead of one mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeTemplate {
    /// Exact (case-folded) type tag
    pub type_name: String,
    /// Name fragment that also selects the template
    pub name_keyword: String,
    pub kind: CompositeKind,
}

/// Classification and design tables.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub light_types: HashSet<String>,
    pub furniture_types: HashSet<String>,
    /// Standard resting height for furniture authored at z = 0
    pub floor_snap_heights: HashMap<String, f32>,
    /// Types mounted at ceiling height when parented to a room
    pub ceiling_mounted: HashSet<String>,
    pub designs: HashMap<String, ObjectDesign>,
    pub fallback_design: ObjectDesign,
    /// Ordered name keyword -> design key pairs
    pub name_synonyms: Vec<(String, String)>,
    pub composites: Vec<CompositeTemplate>,
}

impl Default for Catalog {
    fn default() -> Self {
        use MaterialKind::*;
        use MeshKind::*;

        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<HashSet<_>>();

        let designs = [
            ("bed", Cube, Fabric, "Rectangular bed"),
            ("table", Cube, Wood, "Wooden table"),
            ("chair", Cube, Wood, "Simple chair"),
            ("couch", Cube, Fabric, "Soft couch"),
            ("sofa", Cube, Fabric, "Comfortable sofa"),
            ("wardrobe", Cube, Wood, "Tall wardrobe"),
            ("bookshelf", Cube, Wood, "Book storage"),
            ("desk", Cube, Wood, "Work desk"),
            ("bedside_table", Cube, Wood, "Bedside table"),
            ("coffee_table", Cube, Wood, "Coffee table"),
            ("lamp", Cylinder, Metal, "Cylindrical lamp"),
            ("rocket_lamp", Cylinder, Metal, "Rocket-shaped lamp"),
            ("skylight", Plane, Glass, "Rectangular skylight window"),
            ("directionallight", Plane, Default, "Directional light source"),
            ("vase", Cylinder, Default, "Decorative vase"),
            ("plant", Cylinder, Default, "Potted plant"),
            ("picture", Plane, Default, "Wall picture"),
            ("mirror", Plane, Metal, "Reflective mirror"),
            ("clock", Cylinder, Default, "Wall clock"),
            ("floor", Cube, Floor, "Room floor"),
            ("wall", Cube, Wall, "Room wall"),
            ("ceiling", Cube, Default, "Room ceiling"),
            ("door", Cube, Wood, "Room door"),
            ("window", Cube, Glass, "Room window"),
            ("doorway", Cube, Default, "Room opening"),
        ]
        .into_iter()
        .map(|(key, mesh, material, desc)| (key.to_string(), ObjectDesign::new(mesh, material, desc)))
        .collect();

        let name_synonyms = [
            ("lamp", "lamp"),
            ("light", "lamp"),
            ("rocket", "rocket_lamp"),
            ("table", "table"),
            ("bed", "bed"),
            ("couch", "couch"),
            ("sofa", "sofa"),
            ("wardrobe", "wardrobe"),
            ("closet", "wardrobe"),
            ("plant", "plant"),
            ("vase", "vase"),
            ("picture", "picture"),
            ("painting", "picture"),
            ("mirror", "mirror"),
            ("clock", "clock"),
            ("door", "door"),
            ("window", "window"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let floor_snap_heights = [
            ("table", 37.5),
            ("desk", 37.5),
            ("bedside_table", 37.5),
            ("bed", 25.0),
            ("chair", 40.0),
            ("sofa", 40.0),
        ]
        .into_iter()
        .map(|(k, h)| (k.to_string(), h))
        .collect();

        Self {
            light_types: set(&[
                "light", "lamp", "pointlight", "directionallight",
                "spotlight", "skylight", "rocket_lamp",
            ]),
            furniture_types: set(&[
                "table", "chair", "bed", "sofa", "desk", "wardrobe",
                "bedside_table", "coffee_table", "bookshelf", "cabinet",
            ]),
            floor_snap_heights,
            ceiling_mounted: set(&["skylight"]),
            designs,
            fallback_design: ObjectDesign::new(Cube, Default, "Generic object"),
            name_synonyms,
            composites: vec![CompositeTemplate {
                type_name: "rocket_lamp".to_string(),
                name_keyword: "rocket".to_string(),
                kind: CompositeKind::RocketLamp(RocketLampParams::default()),
            }],
        }
    }
}

impl Catalog {
    /// Classify a type tag by exact case-folded membership.
    pub fn category(&self, kind: &str) -> Category {
        let kind = kind.to_lowercase();
        if self.light_types.contains(&kind) {
            Category::Light
        } else if self.furniture_types.contains(&kind) {
            Category::Furniture
        } else {
            Category::Generic
        }
    }

    /// Resting height applied to furniture authored exactly at z = 0.
    pub fn floor_snap_height(&self, kind: &str) -> Option<f32> {
        self.floor_snap_heights.get(&kind.to_lowercase()).copied()
    }

    pub fn is_ceiling_mounted(&self, kind: &str) -> bool {
        self.ceiling_mounted.contains(&kind.to_lowercase())
    }

    /// Template selected by the type tag alone.
    pub fn composite_for_type(&self, kind: &str) -> Option<&CompositeTemplate> {
        let kind = kind.to_lowercase();
        self.composites.iter().find(|t| t.type_name == kind)
    }

    /// Template selected by type tag, or by a keyword in the object's name.
    pub fn composite_for(&self, object: &ObjectSpec) -> Option<&CompositeTemplate> {
        self.composite_for_type(&object.kind_folded()).or_else(|| {
            let name = object.name().to_lowercase();
            self.composites
                .iter()
                .find(|t| !t.name_keyword.is_empty() && name.contains(&t.name_keyword))
        })
    }

    /// Design lookup for a table key, falling back to the generic design.
    pub fn design(&self, key: &str) -> &ObjectDesign {
        self.designs.get(key).unwrap_or(&self.fallback_design)
    }

    /// Choose the design for an object.
    ///
    /// Base design comes from a name keyword, then the type tag, then the
    /// generic fallback. Explicit `mesh_type`/`material_type` fields win over
    /// the corresponding half of the base design.
    pub fn design_for(&self, object: &ObjectSpec) -> ObjectDesign {
        let name = object.name().to_lowercase();
        let kind = object.kind_folded();

        let base = self
            .name_synonyms
            .iter()
            .find(|(keyword, _)| name.contains(keyword.as_str()))
            .and_then(|(_, key)| self.designs.get(key))
            .or_else(|| self.designs.get(&kind))
            .unwrap_or(&self.fallback_design);

        let mut design = base.clone();
        if let Some(mesh) = object.mesh_type {
            design.mesh = mesh;
        }
        if let Some(material) = object.material_type {
            design.material = material;
        }
        design
    }
}
