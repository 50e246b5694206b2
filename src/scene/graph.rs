//! Parent graph over rooms and objects, and transform resolution.
//!
//! String references are resolved once into typed ids. Objects are then
//! settled one chain at a time: a chain ends at a room or the world root
//! (resolved), at an unknown name (dangling), or back on itself (cycle).
//! Anything hanging below a failed object is excluded with it.

use std::collections::HashMap;

use crate::core::types::{Vec3, vec3};

use super::catalog::Catalog;
use super::config::SceneConfig;
use super::document::{ObjectSpec, RoomSpec, SceneDocument};
use super::node::{ObjectId, ParentRef, RoomId, Transform};
use super::report::{GeometryWarning, ReferenceError};

/// Typed lookup tables over a defaulted scene document.
#[derive(Debug)]
pub struct SceneIndex<'a> {
    doc: &'a SceneDocument,
    rooms_by_name: HashMap<&'a str, RoomId>,
    objects_by_id: HashMap<&'a str, ObjectId>,
    rooms: Vec<RoomId>,
    objects: Vec<ObjectId>,
    errors: Vec<ReferenceError>,
}

impl<'a> SceneIndex<'a> {
    /// Index rooms by name and objects by id. Later duplicates are excluded
    /// and reported.
    pub fn new(doc: &'a SceneDocument) -> Self {
        let mut index = Self {
            doc,
            rooms_by_name: HashMap::new(),
            objects_by_id: HashMap::new(),
            rooms: Vec::new(),
            objects: Vec::new(),
            errors: Vec::new(),
        };

        for (i, room) in doc.rooms.iter().enumerate() {
            if index.rooms_by_name.contains_key(room.name()) {
                index.errors.push(ReferenceError::DuplicateRoomName {
                    name: room.name().to_string(),
                    index: i,
                });
                continue;
            }
            index.rooms_by_name.insert(room.name(), RoomId(i));
            index.rooms.push(RoomId(i));
        }

        for (i, object) in doc.objects.iter().enumerate() {
            if index.objects_by_id.contains_key(object.id()) {
                index.errors.push(ReferenceError::DuplicateObjectId {
                    id: object.id().to_string(),
                    index: i,
                });
                continue;
            }
            index.objects_by_id.insert(object.id(), ObjectId(i));
            index.objects.push(ObjectId(i));
        }

        index
    }

    pub fn document(&self) -> &'a SceneDocument {
        self.doc
    }

    pub fn room(&self, id: RoomId) -> &'a RoomSpec {
        &self.doc.rooms[id.0]
    }

    pub fn object(&self, id: ObjectId) -> &'a ObjectSpec {
        &self.doc.objects[id.0]
    }

    /// Rooms kept after duplicate removal, in document order.
    pub fn rooms(&self) -> &[RoomId] {
        &self.rooms
    }

    /// Objects kept after duplicate removal, in document order.
    pub fn objects(&self) -> &[ObjectId] {
        &self.objects
    }

    pub fn room_by_name(&self, name: &str) -> Option<RoomId> {
        self.rooms_by_name.get(name).copied()
    }

    pub fn object_by_id(&self, id: &str) -> Option<ObjectId> {
        self.objects_by_id.get(id).copied()
    }

    /// Duplicate-identifier errors found while indexing.
    pub fn errors(&self) -> &[ReferenceError] {
        &self.errors
    }

    /// Classify a parent reference. Room names win over object ids.
    pub fn parent_of(&self, id: ObjectId) -> Result<ParentRef, String> {
        let parent = self.object(id).parent.as_deref().unwrap_or_default();
        if parent.is_empty() {
            return Ok(ParentRef::World);
        }
        if let Some(room) = self.room_by_name(parent) {
            return Ok(ParentRef::Room(room));
        }
        self.object_by_id(parent)
            .map(ParentRef::Object)
            .ok_or_else(|| parent.to_string())
    }

    /// World-space floor-to-ceiling box of a room.
    pub fn room_bounds(&self, id: RoomId, config: &SceneConfig) -> crate::math::Aabb {
        let room = self.room(id);
        crate::math::Aabb::from_origin_size(
            vec3(room.position.unwrap_or(config.room_position)),
            vec3(room.size.unwrap_or(config.room_size)),
        )
    }
}

/// An object whose parent chain resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedObject {
    pub id: ObjectId,
    pub parent: ParentRef,
    /// Transform in the parent's frame, after clamping
    pub local: Transform,
    pub world: Transform,
    /// Number of object ancestors
    pub depth: usize,
}

/// Output of transform resolution.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    /// Resolved objects, parents before children
    pub objects: Vec<ResolvedObject>,
    pub errors: Vec<ReferenceError>,
    pub warnings: Vec<GeometryWarning>,
    slots: HashMap<ObjectId, usize>,
}

impl Resolution {
    pub fn get(&self, id: ObjectId) -> Option<&ResolvedObject> {
        self.slots.get(&id).map(|&slot| &self.objects[slot])
    }

    pub fn is_resolved(&self, id: ObjectId) -> bool {
        self.slots.contains_key(&id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Pending,
    Visiting,
    Resolved,
    Failed,
}

/// How a walk up a parent chain ended.
enum ChainEnd {
    Root,
    Resolved,
    Failed(ObjectId),
    Cycle(usize),
    Dangling(String),
}

/// Builds the parent graph, rejects dangling and cyclic chains, and composes
/// world transforms.
///
/// Only positions accumulate along a chain; each object keeps its own
/// rotation and scale.
pub struct TransformResolver<'a> {
    config: &'a SceneConfig,
    catalog: &'a Catalog,
}

impl<'a> TransformResolver<'a> {
    pub fn new(config: &'a SceneConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    pub fn resolve(&self, index: &SceneIndex<'_>) -> Resolution {
        let count = index.document().objects.len();
        let mut status = vec![Status::Pending; count];
        let mut edges: HashMap<ObjectId, ParentRef> = HashMap::new();
        let mut errors = Vec::new();

        for &id in index.objects() {
            if status[id.0] == Status::Pending {
                self.settle(index, id, &mut status, &mut edges, &mut errors);
            }
        }

        let mut resolution = Resolution {
            errors,
            ..Default::default()
        };

        let mut depth: HashMap<ObjectId, usize> = HashMap::new();
        let mut order: Vec<ObjectId> = index
            .objects()
            .iter()
            .copied()
            .filter(|id| status[id.0] == Status::Resolved)
            .collect();
        for &id in &order {
            chain_depth(id, &edges, &mut depth);
        }
        order.sort_by_key(|id| (depth[id], *id));

        for id in order {
            let parent = edges[&id];
            let mut local = Transform::of_object(index.object(id));

            let world_position = match parent {
                // Parentless objects stay world roots but are kept inside the first room.
                ParentRef::World => match index.rooms().first() {
                    Some(&room) => {
                        local.position = self.place_in_room(index, id, room, local.position, &mut resolution.warnings);
                        local.position
                    }
                    None => local.position,
                },
                ParentRef::Room(room) => {
                    local.position = self.place_in_room(index, id, room, local.position, &mut resolution.warnings);
                    local.position
                }
                ParentRef::Object(p) => match resolution.get(p) {
                    Some(resolved) => resolved.world.position + local.position,
                    None => continue,
                },
            };

            let world = Transform {
                position: world_position,
                ..local
            };
            resolution.slots.insert(id, resolution.objects.len());
            resolution.objects.push(ResolvedObject {
                id,
                parent,
                local,
                world,
                depth: depth[&id],
            });
        }

        log::info!(
            "Resolved {} objects ({} reference errors, {} clamped)",
            resolution.objects.len(),
            resolution.errors.len(),
            resolution.warnings.len()
        );
        resolution
    }

    /// Walk up from `start` until the chain ends, then mark every object on
    /// the walked path.
    fn settle(
        &self,
        index: &SceneIndex<'_>,
        start: ObjectId,
        status: &mut [Status],
        edges: &mut HashMap<ObjectId, ParentRef>,
        errors: &mut Vec<ReferenceError>,
    ) {
        let mut path: Vec<ObjectId> = Vec::new();
        let mut current = start;

        let end = loop {
            match status[current.0] {
                Status::Resolved => break ChainEnd::Resolved,
                Status::Failed => break ChainEnd::Failed(current),
                Status::Visiting => {
                    let at = path.iter().position(|&p| p == current).unwrap_or(0);
                    break ChainEnd::Cycle(at);
                }
                Status::Pending => {
                    status[current.0] = Status::Visiting;
                    path.push(current);
                    match index.parent_of(current) {
                        Ok(parent) => {
                            edges.insert(current, parent);
                            match parent {
                                ParentRef::Object(p) => current = p,
                                ParentRef::World | ParentRef::Room(_) => break ChainEnd::Root,
                            }
                        }
                        Err(name) => break ChainEnd::Dangling(name),
                    }
                }
            }
        };

        let id_of = |id: ObjectId| index.object(id).id().to_string();

        match end {
            ChainEnd::Root | ChainEnd::Resolved => {
                for &id in &path {
                    status[id.0] = Status::Resolved;
                }
            }
            ChainEnd::Failed(blocker) => orphan(index, &path, blocker, status, errors),
            ChainEnd::Dangling(parent) => {
                let Some((&last, above)) = path.split_last() else {
                    return;
                };
                errors.push(ReferenceError::Dangling {
                    object: id_of(last),
                    parent,
                });
                status[last.0] = Status::Failed;
                orphan(index, above, last, status, errors);
            }
            ChainEnd::Cycle(at) => {
                let cycle = &path[at..];
                let mut chain: Vec<String> = cycle.iter().map(|&id| id_of(id)).collect();
                chain.push(id_of(cycle[0]));
                for &id in cycle {
                    status[id.0] = Status::Failed;
                    errors.push(ReferenceError::Cycle {
                        object: id_of(id),
                        chain: chain.clone(),
                    });
                }
                orphan(index, &path[..at], cycle[0], status, errors);
            }
        }
    }

    /// Clamp a room-parented or parentless position into the room's inner
    /// footprint (X and Y only) and lift ceiling-mounted types to the ceiling.
    fn place_in_room(
        &self,
        index: &SceneIndex<'_>,
        id: ObjectId,
        room: RoomId,
        position: Vec3,
        warnings: &mut Vec<GeometryWarning>,
    ) -> Vec3 {
        let bounds = index.room_bounds(room, self.config);
        let margin = self.config.room_margin;
        let clamp = |v: f32, lo: f32, hi: f32| lo.max(hi.min(v));

        let mut placed = Vec3::new(
            clamp(position.x, bounds.min.x + margin, bounds.max.x - margin),
            clamp(position.y, bounds.min.y + margin, bounds.max.y - margin),
            position.z,
        );

        let object = index.object(id);
        if placed != position {
            log::info!("Adjusted {} position from {} to {}", object.id(), position, placed);
            warnings.push(GeometryWarning::Clamped {
                object: object.id().to_string(),
                room: index.room(room).name().to_string(),
                from: position,
                to: placed,
            });
        }

        if self.catalog.is_ceiling_mounted(&object.kind_folded()) {
            placed.z = bounds.max.z;
        }
        placed
    }
}

/// Mark `path` failed because `ancestor` did not resolve.
fn orphan(
    index: &SceneIndex<'_>,
    path: &[ObjectId],
    ancestor: ObjectId,
    status: &mut [Status],
    errors: &mut Vec<ReferenceError>,
) {
    for &id in path {
        status[id.0] = Status::Failed;
        errors.push(ReferenceError::Orphaned {
            object: index.object(id).id().to_string(),
            ancestor: index.object(ancestor).id().to_string(),
        });
    }
}

fn chain_depth(id: ObjectId, edges: &HashMap<ObjectId, ParentRef>, memo: &mut HashMap<ObjectId, usize>) -> usize {
    if let Some(&d) = memo.get(&id) {
        return d;
    }
    let d = match edges.get(&id) {
        Some(ParentRef::Object(p)) => chain_depth(*p, edges, memo) + 1,
        _ => 0,
    };
    memo.insert(id, d);
    d
}
