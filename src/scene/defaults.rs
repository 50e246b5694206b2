//! Type-aware default filling.
//!
//! Every fill only touches absent (or null) fields, so applying the pass to
//! its own output changes nothing.

use super::catalog::{Catalog, Category};
use super::config::SceneConfig;
use super::document::{MaterialKind, MeshKind, ObjectSpec, RoomSpec, SceneDocument};

/// Fill every missing field of the scene. Consumes the input snapshot and
/// returns the completed one.
pub fn apply_defaults(scene: SceneDocument, config: &SceneConfig, catalog: &Catalog) -> SceneDocument {
    let SceneDocument { map, rooms, objects } = scene;

    let rooms: Vec<RoomSpec> = rooms
        .into_iter()
        .enumerate()
        .map(|(i, room)| room_defaults(room, i, config))
        .collect();
    let objects: Vec<ObjectSpec> = objects
        .into_iter()
        .map(|object| object_defaults(object, config, catalog))
        .collect();

    log::info!(
        "Applied defaults to {} rooms and {} objects",
        rooms.len(),
        objects.len()
    );

    SceneDocument {
        map: map.or_else(|| Some(config.map_path.clone())),
        rooms,
        objects,
    }
}

fn room_defaults(mut room: RoomSpec, index: usize, config: &SceneConfig) -> RoomSpec {
    room.name.get_or_insert_with(|| format!("room_{}", index));
    room.size.get_or_insert(config.room_size);
    room.position.get_or_insert(config.room_position);
    room.rotation.get_or_insert(config.room_rotation);
    room.doorways.get_or_insert_with(Vec::new);
    room
}

fn object_defaults(mut obj: ObjectSpec, config: &SceneConfig, catalog: &Catalog) -> ObjectSpec {
    obj.position.get_or_insert(config.object_position);
    // Quaternion-rotated objects keep rotation unset; the two are exclusive.
    if obj.rotation_quat.is_none() {
        obj.rotation.get_or_insert(config.object_rotation);
    }
    obj.scale.get_or_insert(config.object_scale);
    obj.parent.get_or_insert_with(|| config.default_parent.clone());

    let kind = obj.kind_folded();
    if obj.name.is_none() {
        let stem = if kind.is_empty() { "object" } else { kind.as_str() };
        obj.name = Some(format!("unnamed_{}", stem));
    }
    if obj.id.is_none() {
        obj.id = Some(format!("{}_001", obj.name()));
    }

    match catalog.category(&kind) {
        Category::Light => light_defaults(&mut obj, &kind, config, catalog),
        Category::Furniture => furniture_defaults(&mut obj, &kind, catalog),
        Category::Generic => {
            obj.mesh_type.get_or_insert(MeshKind::Cube);
            obj.material_type.get_or_insert(MaterialKind::Default);
        }
    }
    obj
}

fn light_defaults(obj: &mut ObjectSpec, kind: &str, config: &SceneConfig, catalog: &Catalog) {
    if catalog.composite_for_type(kind).is_some() {
        // Composite lamps are built procedurally and never get a mesh.
        obj.intensity.get_or_insert(config.rocket_lamp_intensity);
        obj.color.get_or_insert(config.rocket_lamp_color);
        obj.material_type.get_or_insert(MaterialKind::Metal);
        return;
    }

    obj.intensity.get_or_insert(config.light_intensity);
    obj.color.get_or_insert(config.light_color);
    obj.mesh_type.get_or_insert(MeshKind::Cylinder);
    obj.material_type.get_or_insert(MaterialKind::Metal);
}

fn furniture_defaults(obj: &mut ObjectSpec, kind: &str, catalog: &Catalog) {
    obj.mesh_type.get_or_insert(MeshKind::Cube);
    obj.material_type.get_or_insert(MaterialKind::Wood);

    // Exact comparison: an object deliberately placed at z = 0.0 is snapped too.
    if let (Some(height), Some(position)) = (catalog.floor_snap_height(kind), obj.position.as_mut()) {
        if position[2] == 0.0 {
            log::debug!("Snapping {} to standard height {}", obj.id.as_deref().unwrap_or_default(), height);
            position[2] = height;
        }
    }
}
