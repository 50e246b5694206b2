//! Room adjacency detection and doorway synthesis.
//!
//! Two rooms are connected when one's far wall meets the other's near wall
//! (within tolerance) along X or Y, and their extents along the other axis
//! overlap enough to fit a door. Each connection adds one doorway to each
//! room, pointing at the other.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::types::Vec3;

use super::config::SceneConfig;
use super::document::{Doorway, RoomSpec, SceneDocument};

/// Summary of one synthesized doorway pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connection {
    pub room1: String,
    pub room2: String,
    pub door_position: Vec3,
}

/// Wall axis shared by two rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Origin and size of a room, falling back to configured defaults.
fn footprint(room: &RoomSpec, config: &SceneConfig) -> ([f32; 3], [f32; 3]) {
    (
        room.position.unwrap_or(config.room_position),
        room.size.unwrap_or(config.room_size),
    )
}

/// Length of the overlap of two 1D ranges (0 when disjoint).
pub fn overlap(start1: f32, end1: f32, start2: f32, end2: f32) -> f32 {
    (end1.min(end2) - start1.max(start2)).max(0.0)
}

/// Door position if `a`'s far wall on `axis` touches `b`'s near wall.
fn shared_wall(a: &RoomSpec, b: &RoomSpec, axis: Axis, config: &SceneConfig) -> Option<Vec3> {
    let (pos_a, size_a) = footprint(a, config);
    let (pos_b, size_b) = footprint(b, config);
    let (i, j) = (axis.index(), axis.other().index());

    let boundary = pos_a[i] + size_a[i];
    if (boundary - pos_b[i]).abs() >= config.adjacency_tolerance {
        return None;
    }

    let (start, end) = (pos_a[j].max(pos_b[j]), (pos_a[j] + size_a[j]).min(pos_b[j] + size_b[j]));
    if overlap(pos_a[j], pos_a[j] + size_a[j], pos_b[j], pos_b[j] + size_b[j]) <= config.min_doorway_overlap {
        return None;
    }

    let mut door = [0.0; 3];
    door[i] = boundary;
    door[j] = (start + end) / 2.0;
    Some(Vec3::from_array(door))
}

/// Door position for an unordered pair: horizontal (X) walls first, then
/// vertical (Y) walls, each tried with the pair in both orders.
fn door_between(a: &RoomSpec, b: &RoomSpec, config: &SceneConfig) -> Option<Vec3> {
    [Axis::X, Axis::Y].into_iter().find_map(|axis| {
        shared_wall(a, b, axis, config).or_else(|| shared_wall(b, a, axis, config))
    })
}

fn links_to(room: &RoomSpec, other: &str) -> bool {
    room.doorways
        .iter()
        .flatten()
        .any(|d| d.connects_to.as_deref() == Some(other))
}

fn doorway_to(position: Vec3, other: &str) -> Doorway {
    Doorway {
        kind: "doorway".to_string(),
        position: position.to_array(),
        rotation: [0.0; 3],
        connects_to: Some(other.to_string()),
    }
}

/// Indices of rooms whose name was not already taken by an earlier room.
fn first_by_name(rooms: &[RoomSpec]) -> Vec<usize> {
    let mut seen = HashSet::new();
    (0..rooms.len()).filter(|&i| seen.insert(rooms[i].name())).collect()
}

/// Scan every room pair and link adjacent rooms with mirrored doorways.
///
/// Must run after defaults so every room has a size and position. Only the
/// first room with a given name takes part; later duplicates get no doorways.
/// Pairs that already point at each other are left alone.
pub fn connect_rooms(scene: SceneDocument, config: &SceneConfig) -> (SceneDocument, Vec<Connection>) {
    let SceneDocument { map, mut rooms, objects } = scene;
    let mut connections = Vec::new();
    let kept = first_by_name(&rooms);

    for (n, &i) in kept.iter().enumerate() {
        for &j in &kept[n + 1..] {
            let Some(door) = door_between(&rooms[i], &rooms[j], config) else {
                continue;
            };
            let (name1, name2) = (rooms[i].name().to_string(), rooms[j].name().to_string());
            if links_to(&rooms[i], &name2) || links_to(&rooms[j], &name1) {
                continue;
            }

            rooms[i].doorways.get_or_insert_with(Vec::new).push(doorway_to(door, &name2));
            rooms[j].doorways.get_or_insert_with(Vec::new).push(doorway_to(door, &name1));

            log::info!("Connected {} to {} at {}", name1, name2, door);
            connections.push(Connection {
                room1: name1,
                room2: name2,
                door_position: door,
            });
        }
    }

    (SceneDocument { map, rooms, objects }, connections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, position: [f32; 3], size: [f32; 3]) -> RoomSpec {
        RoomSpec {
            name: Some(name.to_string()),
            size: Some(size),
            position: Some(position),
            rotation: Some([0.0; 3]),
            doorways: Some(Vec::new()),
        }
    }

    fn scene(rooms: Vec<RoomSpec>) -> SceneDocument {
        SceneDocument {
            map: None,
            rooms,
            objects: Vec::new(),
        }
    }

    #[test]
    fn test_side_by_side_rooms_get_one_mirrored_pair() {
        let config = SceneConfig::default();
        let (doc, connections) = connect_rooms(
            scene(vec![
                room("a", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("b", [600.0, 0.0, 0.0], [500.0, 800.0, 350.0]),
            ]),
            &config,
        );

        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].door_position, Vec3::new(600.0, 400.0, 0.0));

        let a = doc.rooms[0].doorways.as_ref().unwrap();
        let b = doc.rooms[1].doorways.as_ref().unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].connects_to.as_deref(), Some("b"));
        assert_eq!(b[0].connects_to.as_deref(), Some("a"));
        assert_eq!(a[0].position, [600.0, 400.0, 0.0]);
    }

    #[test]
    fn test_reverse_order_pair_is_detected() {
        let config = SceneConfig::default();
        let (_, connections) = connect_rooms(
            scene(vec![
                room("east", [600.0, 0.0, 0.0], [500.0, 800.0, 350.0]),
                room("west", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
            ]),
            &config,
        );
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].door_position.x, 600.0);
    }

    #[test]
    fn test_vertical_adjacency_with_gap_inside_tolerance() {
        let config = SceneConfig::default();
        let (_, connections) = connect_rooms(
            scene(vec![
                room("front", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("back", [200.0, 810.0, 0.0], [600.0, 500.0, 350.0]),
            ]),
            &config,
        );
        assert_eq!(connections.len(), 1);
        // Overlap on X is [200, 600]; door sits on the front room's far wall.
        assert_eq!(connections[0].door_position, Vec3::new(400.0, 800.0, 0.0));
    }

    #[test]
    fn test_small_overlap_or_far_gap_gives_no_door() {
        let config = SceneConfig::default();
        let (_, connections) = connect_rooms(
            scene(vec![
                room("a", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("narrow", [600.0, 750.0, 0.0], [300.0, 400.0, 350.0]),
                room("far", [0.0, 1300.0, 0.0], [600.0, 300.0, 350.0]),
            ]),
            &config,
        );
        assert!(connections.iter().all(|c| c.room2 != "far" && c.room1 != "far"));
        assert!(!connections.iter().any(|c| c.room1 == "a" && c.room2 == "narrow"));
    }

    #[test]
    fn test_room_connects_to_several_and_rerun_adds_nothing() {
        let config = SceneConfig::default();
        let rooms = vec![
            room("hub", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
            room("east", [600.0, 0.0, 0.0], [400.0, 800.0, 350.0]),
            room("north", [0.0, 800.0, 0.0], [600.0, 400.0, 350.0]),
        ];
        let (doc, connections) = connect_rooms(scene(rooms), &config);
        assert_eq!(connections.len(), 2);
        assert_eq!(doc.rooms[0].doorways.as_ref().unwrap().len(), 2);

        let (doc, again) = connect_rooms(doc, &config);
        assert!(again.is_empty());
        assert_eq!(doc.rooms[0].doorways.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_room_names_take_no_part() {
        let config = SceneConfig::default();
        let (doc, connections) = connect_rooms(
            scene(vec![
                room("a", [0.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("b", [5000.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("b", [600.0, 0.0, 0.0], [600.0, 800.0, 350.0]),
                room("c", [0.0, 800.0, 0.0], [600.0, 800.0, 350.0]),
                room("c", [600.0, 800.0, 0.0], [600.0, 800.0, 350.0]),
            ]),
            &config,
        );

        let pairs: Vec<(&str, &str)> = connections
            .iter()
            .map(|c| (c.room1.as_str(), c.room2.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "c")]);

        let targets = |i: usize| -> Vec<&str> {
            doc.rooms[i]
                .doorways
                .iter()
                .flatten()
                .filter_map(|d| d.connects_to.as_deref())
                .collect()
        };
        assert_eq!(targets(0), vec!["c"]);
        assert!(targets(1).is_empty());
        assert!(targets(2).is_empty());
        assert_eq!(targets(3), vec!["a"]);
        assert!(targets(4).is_empty());
    }

    #[test]
    fn test_overlap() {
        assert_eq!(overlap(0.0, 10.0, 5.0, 20.0), 5.0);
        assert_eq!(overlap(0.0, 10.0, 15.0, 20.0), 0.0);
    }
}
