//! Composite expansion and align-on-contact.
//!
//! A composite object spawns an invisible anchor at its resolved transform
//! and a fixed set of primitive parts placed relative to that anchor. Once
//! expanded, each composite with a room or object parent is moved vertically
//! so the bottom of its parts touches the parent's top surface.

use std::collections::{BTreeMap, HashMap};

use crate::core::types::{Vec3, vec3};
use crate::math::Aabb;

use super::catalog::{Catalog, CompositeKind, CompositeTemplate, ObjectDesign, RocketLampParams};
use super::config::SceneConfig;
use super::document::{MeshKind, ObjectSpec};
use super::graph::{Resolution, SceneIndex};
use super::node::{LightSpec, ObjectId, ParentRef, Transform};
use super::report::GeometryWarning;

/// One generated sub-part, positioned relative to the anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct CompositePart {
    /// Appended to the composite id to form the part id
    pub suffix: String,
    /// Mesh and material; `None` for the light part
    pub design: Option<ObjectDesign>,
    pub local: Transform,
    pub light: Option<LightSpec>,
}

impl CompositePart {
    /// Anchor-relative box of a mesh part. Light parts have no extent.
    pub fn bounds(&self) -> Option<Aabb> {
        let design = self.design.as_ref()?;
        Some(Aabb::from_center_half_extent(
            self.local.position,
            design.mesh.half_extent() * self.local.scale,
        ))
    }
}

/// A composite object expanded into parts.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpandedComposite {
    pub object: ObjectId,
    pub template: String,
    pub parts: Vec<CompositePart>,
    /// Union of the mesh parts, anchor-relative
    pub bounds: Aabb,
}

impl ExpandedComposite {
    /// Number of parts that are meshes (the anchor and light excluded).
    pub fn mesh_parts(&self) -> usize {
        self.parts.iter().filter(|p| p.design.is_some()).count()
    }
}

/// Output of the expansion pass.
#[derive(Clone, Debug, Default)]
pub struct Expansion {
    pub composites: BTreeMap<ObjectId, ExpandedComposite>,
    pub warnings: Vec<GeometryWarning>,
}

impl Expansion {
    pub fn get(&self, id: ObjectId) -> Option<&ExpandedComposite> {
        self.composites.get(&id)
    }
}

/// Expands composite templates and applies align-on-contact.
pub struct CompositeExpander<'a> {
    config: &'a SceneConfig,
    catalog: &'a Catalog,
}

impl<'a> CompositeExpander<'a> {
    pub fn new(config: &'a SceneConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Build the parts of a single object, if its type or name selects a
    /// template.
    pub fn expand_object(&self, id: ObjectId, object: &ObjectSpec) -> Option<ExpandedComposite> {
        let template = self.catalog.composite_for(object)?;
        let parts = self.parts(template, object);

        let bounds = parts
            .iter()
            .filter_map(CompositePart::bounds)
            .reduce(|a, b| a.merged(&b))
            .unwrap_or_default();

        log::debug!("Expanded {} into {} parts", object.id(), parts.len());
        Some(ExpandedComposite {
            object: id,
            template: template.type_name.clone(),
            parts,
            bounds,
        })
    }

    fn parts(&self, template: &CompositeTemplate, object: &ObjectSpec) -> Vec<CompositePart> {
        match &template.kind {
            CompositeKind::RocketLamp(params) => rocket_lamp(params, object),
        }
    }

    /// Expand every resolved composite, then move composites (and whatever
    /// hangs below them) so they rest on their parents.
    ///
    /// Consumes the resolution and returns the aligned one.
    pub fn expand(&self, index: &SceneIndex<'_>, resolution: Resolution) -> (Resolution, Expansion) {
        let mut expansion = Expansion::default();
        for resolved in &resolution.objects {
            if let Some(composite) = self.expand_object(resolved.id, index.object(resolved.id)) {
                expansion.composites.insert(resolved.id, composite);
            }
        }

        let mut resolution = resolution;
        let mut shifts: HashMap<ObjectId, f32> = HashMap::new();

        // Parents come first, so a parent's shift is final before its children.
        for slot in 0..resolution.objects.len() {
            let (id, parent) = (resolution.objects[slot].id, resolution.objects[slot].parent);

            let inherited = match parent {
                ParentRef::Object(p) => shifts.get(&p).copied().unwrap_or(0.0),
                ParentRef::World | ParentRef::Room(_) => 0.0,
            };
            resolution.objects[slot].world.position.z += inherited;

            let mut own = 0.0;
            if let Some(composite) = expansion.composites.get(&id) {
                let world = resolution.objects[slot].world.position;
                let bottom = world.z + composite.bounds.min.z;

                if let Some(top) = self.parent_top(index, &resolution, &expansion, parent) {
                    let offset = top - bottom;
                    if offset.abs() > self.config.alignment_threshold {
                        own = offset;
                        let parent_name = match parent {
                            ParentRef::Room(room) => index.room(room).name(),
                            ParentRef::Object(p) => index.object(p).id(),
                            ParentRef::World => "",
                        };
                        log::info!(
                            "Aligned {} with {} by {:.2}",
                            index.object(id).id(),
                            parent_name,
                            offset
                        );
                        expansion.warnings.push(GeometryWarning::Aligned {
                            object: index.object(id).id().to_string(),
                            parent: parent_name.to_string(),
                            offset,
                        });
                    }
                }
            }

            if own != 0.0 {
                let resolved = &mut resolution.objects[slot];
                resolved.world.position.z += own;
                resolved.local.position.z += own;
            }
            if inherited + own != 0.0 {
                shifts.insert(id, inherited + own);
            }
        }

        (resolution, expansion)
    }

    /// World Z of the surface a composite should rest on.
    fn parent_top(
        &self,
        index: &SceneIndex<'_>,
        resolution: &Resolution,
        expansion: &Expansion,
        parent: ParentRef,
    ) -> Option<f32> {
        match parent {
            ParentRef::World => None,
            ParentRef::Room(room) => {
                let floor = index.room_bounds(room, self.config).min.z;
                Some(floor + MeshKind::Cube.half_extent().z * self.config.slab_thickness)
            }
            ParentRef::Object(p) => {
                let resolved = resolution.get(p)?;
                if let Some(composite) = expansion.get(p) {
                    return Some(composite.bounds.translated(resolved.world.position).top());
                }
                let design = self.catalog.design_for(index.object(p));
                let extent = design.mesh.half_extent() * resolved.world.scale;
                Some(Aabb::from_center_half_extent(resolved.world.position, extent).top())
            }
        }
    }
}

/// Body, nose and four fins, plus a light above the body when the lamp has
/// a positive intensity.
fn rocket_lamp(params: &RocketLampParams, object: &ObjectSpec) -> Vec<CompositePart> {
    let half = params.primitive_half_height;
    let body_half = half * params.body_scale.z;
    let nose_half = half * params.nose_scale.z;
    let fin_half = half * params.fin_scale.z;

    let mesh = |suffix: String, kind: MeshKind, position: Vec3, scale: Vec3| CompositePart {
        suffix,
        design: Some(ObjectDesign::new(kind, params.material, "Rocket lamp part")),
        local: Transform::from_position_scale(position, scale),
        light: None,
    };

    let mut parts = vec![
        mesh(
            "body".into(),
            MeshKind::Cylinder,
            Vec3::new(0.0, 0.0, body_half),
            params.body_scale,
        ),
        mesh(
            "nose".into(),
            MeshKind::Cylinder,
            Vec3::new(0.0, 0.0, body_half * 2.0 + nose_half),
            params.nose_scale,
        ),
    ];

    let r = params.fin_radius;
    let fins = [(r, 0.0), (-r, 0.0), (0.0, r), (0.0, -r)];
    for (i, (x, y)) in fins.into_iter().enumerate() {
        parts.push(mesh(
            format!("fin_{}", i),
            MeshKind::Cube,
            Vec3::new(x, y, fin_half),
            params.fin_scale,
        ));
    }

    if let Some(intensity) = object.intensity.filter(|i| *i > 0.0) {
        let color = object.color.map(vec3).unwrap_or(Vec3::ONE);
        parts.push(CompositePart {
            suffix: "light".into(),
            design: None,
            local: Transform::from_position(Vec3::new(0.0, 0.0, body_half * 2.0 + params.light_clearance)),
            light: Some(LightSpec {
                intensity,
                color,
                offset: Vec3::ZERO,
            }),
        });
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::defaults::apply_defaults;
    use crate::scene::document::SceneDocument;
    use crate::scene::graph::TransformResolver;
    use serde_json::json;

    fn lamp(intensity: Option<f32>) -> ObjectSpec {
        ObjectSpec {
            id: Some("r".into()),
            kind: Some("rocket_lamp".into()),
            intensity,
            ..Default::default()
        }
    }

    fn run(raw: serde_json::Value) -> (SceneDocument, Resolution, Expansion) {
        let config = SceneConfig::default();
        let catalog = Catalog::default();
        let doc = apply_defaults(SceneDocument::from_value(raw).unwrap(), &config, &catalog);
        let index = SceneIndex::new(&doc);
        let resolution = TransformResolver::new(&config, &catalog).resolve(&index);
        let (resolution, expansion) = CompositeExpander::new(&config, &catalog).expand(&index, resolution);
        (doc.clone(), resolution, expansion)
    }

    fn world_z(doc: &SceneDocument, resolution: &Resolution, id: &str) -> f32 {
        let index = SceneIndex::new(doc);
        resolution.get(index.object_by_id(id).unwrap()).unwrap().world.position.z
    }

    #[test]
    fn test_rocket_lamp_part_counts() {
        let config = SceneConfig::default();
        let catalog = Catalog::default();
        let expander = CompositeExpander::new(&config, &catalog);

        let lit = expander.expand_object(ObjectId(0), &lamp(Some(5000.0))).unwrap();
        assert_eq!(lit.parts.len(), 7);
        assert_eq!(lit.mesh_parts(), 6);

        let dark = expander.expand_object(ObjectId(0), &lamp(None)).unwrap();
        assert_eq!(dark.parts.len(), 6);

        let off = expander.expand_object(ObjectId(0), &lamp(Some(0.0))).unwrap();
        assert_eq!(off.parts.len(), 6);
    }

    #[test]
    fn test_nose_sits_on_body_without_gap() {
        let config = SceneConfig::default();
        let catalog = Catalog::default();
        let composite = CompositeExpander::new(&config, &catalog)
            .expand_object(ObjectId(0), &lamp(Some(5000.0)))
            .unwrap();

        let body = composite.parts.iter().find(|p| p.suffix == "body").unwrap().bounds().unwrap();
        let nose = composite.parts.iter().find(|p| p.suffix == "nose").unwrap().bounds().unwrap();
        assert!((body.top() - nose.bottom()).abs() < 1e-4);
        assert!((body.top() - 80.0).abs() < 1e-4);
        assert!((nose.center().z - 95.0).abs() < 1e-4);

        let light = composite.parts.iter().find(|p| p.suffix == "light").unwrap();
        assert_eq!(light.local.position, Vec3::new(0.0, 0.0, 130.0));
        assert!(light.bounds().is_none());

        assert!(composite.bounds.min.z.abs() < 1e-4);
        assert!((composite.bounds.max.z - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_fins_are_symmetric() {
        let config = SceneConfig::default();
        let catalog = Catalog::default();
        let composite = CompositeExpander::new(&config, &catalog)
            .expand_object(ObjectId(0), &lamp(None))
            .unwrap();
        let fins: Vec<Vec3> = composite
            .parts
            .iter()
            .filter(|p| p.suffix.starts_with("fin_"))
            .map(|p| p.local.position)
            .collect();
        assert_eq!(fins.len(), 4);
        assert_eq!(fins.iter().copied().sum::<Vec3>().truncate(), glam::Vec2::ZERO);
        assert!(fins.iter().all(|p| (p.z - 10.0).abs() < 1e-4));
    }

    #[test]
    fn test_name_keyword_selects_template() {
        let config = SceneConfig::default();
        let catalog = Catalog::default();
        let object = ObjectSpec {
            id: Some("deco".into()),
            name: Some("Big Rocket".into()),
            kind: Some("vase".into()),
            ..Default::default()
        };
        let composite = CompositeExpander::new(&config, &catalog).expand_object(ObjectId(0), &object);
        assert_eq!(composite.map(|c| c.parts.len()), Some(6));
    }

    #[test]
    fn test_lamp_on_table_is_already_flush() {
        // Table top: 37.5 + 50. Lamp authored at local z 50 sits on it.
        let (doc, res, exp) = run(json!({
            "rooms": [{"name": "loft"}],
            "objects": [
                {"id": "table", "type": "table", "parent": "loft", "position": [300, 400, 0]},
                {"id": "rocket", "type": "rocket_lamp", "parent": "table", "position": [0, 0, 50]}
            ]
        }));
        assert!(exp.warnings.is_empty());
        assert!((world_z(&doc, &res, "rocket") - 87.5).abs() < 1e-4);
    }

    #[test]
    fn test_floating_lamp_drops_onto_table_with_children() {
        let (doc, res, exp) = run(json!({
            "rooms": [{"name": "loft"}],
            "objects": [
                {"id": "table", "type": "table", "parent": "loft", "position": [300, 400, 0]},
                {"id": "rocket", "type": "rocket_lamp", "parent": "table", "position": [0, 0, 80]},
                {"id": "sticker", "type": "decal", "parent": "rocket", "position": [0, 0, 10]}
            ]
        }));
        assert_eq!(exp.warnings.len(), 1);
        assert!(matches!(&exp.warnings[0], GeometryWarning::Aligned { offset, .. } if (offset + 30.0).abs() < 1e-4));
        assert!((world_z(&doc, &res, "rocket") - 87.5).abs() < 1e-4);
        assert!((world_z(&doc, &res, "sticker") - 97.5).abs() < 1e-4);

        let index = SceneIndex::new(&doc);
        let rocket = res.get(index.object_by_id("rocket").unwrap()).unwrap();
        assert!((rocket.local.position.z - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_room_parented_lamp_rests_on_floor_slab() {
        let (doc, res, exp) = run(json!({
            "rooms": [{"name": "loft"}],
            "objects": [{"id": "rocket", "type": "rocket_lamp", "parent": "loft", "position": [300, 400, 0]}]
        }));
        assert_eq!(exp.warnings.len(), 1);
        assert!((world_z(&doc, &res, "rocket") - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_small_offsets_and_world_roots_are_skipped() {
        let (doc, res, exp) = run(json!({
            "rooms": [{"name": "loft"}],
            "objects": [
                {"id": "a", "type": "rocket_lamp", "parent": "loft", "position": [300, 400, 5.05]},
                {"id": "b", "type": "rocket_lamp", "parent": "", "position": [0, 0, 123]}
            ]
        }));
        assert!(exp.warnings.is_empty());
        assert!((world_z(&doc, &res, "a") - 5.05).abs() < 1e-4);
        assert!((world_z(&doc, &res, "b") - 123.0).abs() < 1e-4);
    }
}
