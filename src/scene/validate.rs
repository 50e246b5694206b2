//! Shape validation of the raw, untrusted scene value.
//!
//! [`validate`] never fails: it collects every issue it can find. Only a
//! broken top level (no `rooms`/`objects` arrays) stops it early, and then it
//! reports that one issue instead of cascading. [`validate_strict`] turns the
//! same top-level check into a fatal error.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::error::Error;
use crate::core::types::Result;

use super::catalog::{Catalog, Category};
use super::document::Doorway;

/// Where an issue was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Scene,
    Room(usize),
    Object(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Scene => write!(f, "Scene"),
            Location::Room(i) => write!(f, "Room {}", i),
            Location::Object(i) => write!(f, "Object {}", i),
        }
    }
}

/// What is wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Problem {
    #[error("scene data must be a dictionary")]
    NotADocument,
    #[error("missing '{0}' key")]
    MissingKey(&'static str),
    #[error("'{0}' must be a list")]
    NotAList(&'static str),
    #[error("must be a dictionary")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("'{field}' must be a list of {len} numbers")]
    BadVector { field: &'static str, len: usize },
    #[error("'{0}' must be a number")]
    NotANumber(&'static str),
    #[error("use either 'rotation' or 'rotation_quat', not both")]
    ConflictingRotation,
    #[error("doorway {0} is malformed and will be ignored")]
    BadDoorway(usize),
}

/// One advisory validation finding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{location}: {problem}")]
pub struct ValidationIssue {
    pub location: Location,
    pub problem: Problem,
}

impl ValidationIssue {
    fn new(location: Location, problem: Problem) -> Self {
        Self { location, problem }
    }

    /// Field whose value will be dropped and replaced by a default.
    pub fn replaced_field(&self) -> Option<&'static str> {
        match self.problem {
            Problem::BadVector { field, .. } | Problem::NotANumber(field) => Some(field),
            _ => None,
        }
    }
}

/// Collect every structural defect in a raw scene value.
pub fn validate(raw: &Value, catalog: &Catalog) -> Vec<ValidationIssue> {
    let doc = match top_level(raw) {
        Ok(doc) => doc,
        Err(problem) => return vec![ValidationIssue::new(Location::Scene, problem)],
    };

    let mut issues = Vec::new();

    for (i, room) in array(doc, "rooms").iter().enumerate() {
        validate_room(room, Location::Room(i), &mut issues);
    }
    for (i, object) in array(doc, "objects").iter().enumerate() {
        validate_object(object, Location::Object(i), catalog, &mut issues);
    }

    issues
}

/// Fail unless the value is a dictionary with `rooms` and `objects` lists.
pub fn validate_strict(raw: &Value) -> Result<()> {
    top_level(raw)
        .map(|_| ())
        .map_err(|problem| Error::Schema(problem.to_string()))
}

fn top_level(raw: &Value) -> std::result::Result<&Map<String, Value>, Problem> {
    let doc = raw.as_object().ok_or(Problem::NotADocument)?;
    for key in ["rooms", "objects"] {
        match doc.get(key) {
            None => return Err(Problem::MissingKey(key)),
            Some(v) if !v.is_array() => return Err(Problem::NotAList(key)),
            Some(_) => {}
        }
    }
    Ok(doc)
}

fn array<'a>(doc: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn validate_room(room: &Value, location: Location, issues: &mut Vec<ValidationIssue>) {
    let Some(room) = room.as_object() else {
        issues.push(ValidationIssue::new(location, Problem::NotAnObject));
        return;
    };

    if !room.contains_key("name") {
        issues.push(ValidationIssue::new(location, Problem::MissingField("name")));
    }
    for field in ["size", "position"] {
        check_vector(room, field, 3, location, issues);
    }

    if !is_present(room, "doorways") {
        return;
    }
    let Some(doorways) = room["doorways"].as_array() else {
        issues.push(ValidationIssue::new(location, Problem::NotAList("doorways")));
        return;
    };
    for (i, doorway) in doorways.iter().enumerate() {
        if Doorway::deserialize(doorway).is_err() {
            issues.push(ValidationIssue::new(location, Problem::BadDoorway(i)));
        }
    }
}

fn validate_object(
    object: &Value,
    location: Location,
    catalog: &Catalog,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(object) = object.as_object() else {
        issues.push(ValidationIssue::new(location, Problem::NotAnObject));
        return;
    };

    for field in ["name", "id", "type"] {
        if !object.contains_key(field) {
            issues.push(ValidationIssue::new(location, Problem::MissingField(field)));
        }
    }
    for field in ["position", "rotation", "scale"] {
        check_vector(object, field, 3, location, issues);
    }
    check_vector(object, "rotation_quat", 4, location, issues);

    if is_present(object, "rotation") && is_present(object, "rotation_quat") {
        issues.push(ValidationIssue::new(location, Problem::ConflictingRotation));
    }

    let kind = object.get("type").and_then(Value::as_str).unwrap_or_default();
    if catalog.category(kind) == Category::Light {
        if is_present(object, "intensity") && !object["intensity"].is_number() {
            issues.push(ValidationIssue::new(location, Problem::NotANumber("intensity")));
        }
        check_vector(object, "color", 3, location, issues);
    }
}

/// Null counts as absent throughout, matching the defaults pass.
fn is_present(map: &Map<String, Value>, field: &str) -> bool {
    map.get(field).is_some_and(|v| !v.is_null())
}

fn check_vector(
    map: &Map<String, Value>,
    field: &'static str,
    len: usize,
    location: Location,
    issues: &mut Vec<ValidationIssue>,
) {
    if !is_present(map, field) {
        return;
    }
    let well_formed = map[field]
        .as_array()
        .is_some_and(|items| items.len() == len && items.iter().all(Value::is_number));
    if !well_formed {
        issues.push(ValidationIssue::new(location, Problem::BadVector { field, len }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: Value) -> Vec<ValidationIssue> {
        validate(&raw, &Catalog::default())
    }

    #[test]
    fn test_clean_scene_has_no_issues() {
        let issues = run(json!({
            "rooms": [{"name": "loft", "size": [800, 1000, 350], "position": [0, 0, 0]}],
            "objects": [{
                "name": "lamp", "id": "lamp_1", "type": "lamp",
                "position": [1, 2, 3], "intensity": 3000, "color": [1, 1, 1]
            }]
        }));
        assert!(issues.is_empty(), "{:?}", issues);
    }

    #[test]
    fn test_missing_top_level_key_is_single_issue() {
        let issues = run(json!({"rooms": [{"size": "big"}]}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].problem, Problem::MissingKey("objects"));
        assert_eq!(issues[0].to_string(), "Scene: missing 'objects' key");
    }

    #[test]
    fn test_object_issues_are_collected_exhaustively() {
        let issues = run(json!({
            "rooms": [],
            "objects": [{"type": "lamp", "position": [1, 2], "scale": [1, "x", 1], "intensity": "high"}]
        }));
        let problems: Vec<_> = issues.iter().map(|i| i.problem.clone()).collect();
        assert!(problems.contains(&Problem::MissingField("name")));
        assert!(problems.contains(&Problem::MissingField("id")));
        assert!(problems.contains(&Problem::BadVector { field: "position", len: 3 }));
        assert!(problems.contains(&Problem::BadVector { field: "scale", len: 3 }));
        assert!(problems.contains(&Problem::NotANumber("intensity")));
        assert!(issues.iter().all(|i| i.location == Location::Object(0)));
    }

    #[test]
    fn test_light_fields_ignored_for_non_lights() {
        let issues = run(json!({
            "rooms": [],
            "objects": [{"name": "t", "id": "t", "type": "table", "intensity": "n/a", "color": 4}]
        }));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_room_checks() {
        let issues = run(json!({
            "rooms": [{"size": [1, 2, 3, 4]}, "hall"],
            "objects": []
        }));
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].to_string(), "Room 0: missing required field 'name'");
        assert_eq!(issues[1].problem, Problem::BadVector { field: "size", len: 3 });
        assert_eq!(issues[2].to_string(), "Room 1: must be a dictionary");
    }

    #[test]
    fn test_malformed_doorways_reported_individually() {
        let issues = run(json!({
            "rooms": [
                {"name": "loft", "doorways": [{"position": [1, 2, 3]}, {"position": "north"}, 7]},
                {"name": "hall", "doorways": "east"}
            ],
            "objects": []
        }));
        let problems: Vec<_> = issues.iter().map(|i| i.problem.clone()).collect();
        assert_eq!(
            problems,
            vec![Problem::BadDoorway(1), Problem::BadDoorway(2), Problem::NotAList("doorways")]
        );
        assert_eq!(issues[0].to_string(), "Room 0: doorway 1 is malformed and will be ignored");
    }

    #[test]
    fn test_rotation_conflict_and_quat_shape() {
        let issues = run(json!({
            "rooms": [],
            "objects": [{"name": "a", "id": "a", "type": "vase", "rotation": [0, 0, 0], "rotation_quat": [0, 0, 1]}]
        }));
        let problems: Vec<_> = issues.iter().map(|i| i.problem.clone()).collect();
        assert!(problems.contains(&Problem::BadVector { field: "rotation_quat", len: 4 }));
        assert!(problems.contains(&Problem::ConflictingRotation));
    }

    #[test]
    fn test_null_fields_are_not_issues() {
        let issues = run(json!({
            "rooms": [],
            "objects": [{"name": "a", "id": "a", "type": "vase", "position": null, "rotation_quat": null}]
        }));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_strict_entry_point() {
        assert!(validate_strict(&json!({"rooms": [], "objects": []})).is_ok());
        assert!(matches!(validate_strict(&json!({"objects": []})), Err(Error::Schema(_))));
        assert!(matches!(validate_strict(&json!({"rooms": {}, "objects": []})), Err(Error::Schema(_))));
        assert!(matches!(validate_strict(&json!([1, 2])), Err(Error::Schema(_))));
    }

    #[test]
    fn test_replaced_field() {
        let issue = ValidationIssue::new(Location::Object(2), Problem::BadVector { field: "scale", len: 3 });
        assert_eq!(issue.replaced_field(), Some("scale"));
        let issue = ValidationIssue::new(Location::Object(2), Problem::MissingField("id"));
        assert_eq!(issue.replaced_field(), None);
    }
}
