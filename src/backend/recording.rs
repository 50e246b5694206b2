//! In-memory backend that records every call.
//!
//! Used for dry runs and tests. Labels registered with
//! [`RecordingBackend::fail_on`] make the matching spawn, light or level
//! call fail. Meshes and materials are recorded as the engine asset paths
//! a real backend would load.

use std::collections::HashSet;

use crate::core::types::{Quat, Vec3};
use crate::scene::{MaterialKind, MeshKind, Transform};

use super::{BackendError, Handle, RenderBackend};

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    OpenLevel(String),
    Spawn { handle: Handle, label: String, position: Vec3, rotation: Quat },
    AssignMesh { handle: Handle, asset: &'static str },
    AssignMaterial { handle: Handle, slot: usize, asset: &'static str },
    Attach { child: Handle, parent: Handle, keep_relative: bool },
    SetRelativeLocation { handle: Handle, location: Vec3 },
    CreateLight { handle: Handle, label: String, position: Vec3, intensity: f32 },
    SaveLevel(String),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    labels: Vec<String>,
    failing: HashSet<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls for `label` fail from now on.
    pub fn fail_on(&mut self, label: impl Into<String>) {
        self.failing.insert(label.into());
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Label a handle was created with.
    pub fn label(&self, handle: Handle) -> Option<&str> {
        self.labels.get(handle.0 as usize).map(String::as_str)
    }

    fn check(&self, operation: &'static str, label: &str) -> Result<(), BackendError> {
        if self.failing.contains(label) {
            return Err(BackendError::new(operation, label, "rejected by backend"));
        }
        Ok(())
    }

    fn next_handle(&mut self, label: &str) -> Handle {
        self.labels.push(label.to_string());
        Handle(self.labels.len() as u64 - 1)
    }

    fn known(&self, operation: &'static str, handle: Handle) -> Result<(), BackendError> {
        if (handle.0 as usize) < self.labels.len() {
            Ok(())
        } else {
            Err(BackendError::new(operation, format!("{:?}", handle), "unknown handle"))
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn open_level(&mut self, map: &str) -> Result<(), BackendError> {
        self.check("open_level", map)?;
        self.calls.push(BackendCall::OpenLevel(map.to_string()));
        Ok(())
    }

    fn spawn(&mut self, label: &str, transform: &Transform) -> Result<Handle, BackendError> {
        self.check("spawn", label)?;
        let handle = self.next_handle(label);
        self.calls.push(BackendCall::Spawn {
            handle,
            label: label.to_string(),
            position: transform.position,
            rotation: transform.rotation.to_quat(),
        });
        Ok(handle)
    }

    fn assign_mesh(&mut self, handle: Handle, mesh: MeshKind) -> Result<(), BackendError> {
        self.known("assign_mesh", handle)?;
        self.calls.push(BackendCall::AssignMesh {
            handle,
            asset: mesh.asset_path(),
        });
        Ok(())
    }

    fn assign_material(&mut self, handle: Handle, slot: usize, material: MaterialKind) -> Result<(), BackendError> {
        self.known("assign_material", handle)?;
        self.calls.push(BackendCall::AssignMaterial {
            handle,
            slot,
            asset: material.asset_path(),
        });
        Ok(())
    }

    fn attach(&mut self, child: Handle, parent: Handle, keep_relative: bool) -> Result<(), BackendError> {
        self.known("attach", child)?;
        self.known("attach", parent)?;
        self.calls.push(BackendCall::Attach {
            child,
            parent,
            keep_relative,
        });
        Ok(())
    }

    fn set_relative_location(&mut self, handle: Handle, location: Vec3) -> Result<(), BackendError> {
        self.known("set_relative_location", handle)?;
        self.calls.push(BackendCall::SetRelativeLocation { handle, location });
        Ok(())
    }

    fn create_light(
        &mut self,
        label: &str,
        transform: &Transform,
        intensity: f32,
        _color: Vec3,
    ) -> Result<Handle, BackendError> {
        self.check("create_light", label)?;
        let handle = self.next_handle(label);
        self.calls.push(BackendCall::CreateLight {
            handle,
            label: label.to_string(),
            position: transform.position,
            intensity,
        });
        Ok(handle)
    }

    fn save_level(&mut self, map: &str) -> Result<(), BackendError> {
        self.check("save_level", map)?;
        self.calls.push(BackendCall::SaveLevel(map.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_sequential_and_labelled() {
        let mut backend = RecordingBackend::new();
        let a = backend.spawn("a", &Transform::identity()).unwrap();
        let b = backend
            .create_light("b", &Transform::from_position(Vec3::Z), 100.0, Vec3::ONE)
            .unwrap();
        assert_eq!(a, Handle(0));
        assert_eq!(b, Handle(1));
        assert_eq!(backend.label(b), Some("b"));
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn test_fail_on_and_unknown_handle() {
        let mut backend = RecordingBackend::new();
        backend.fail_on("bad");
        assert!(backend.spawn("bad", &Transform::identity()).is_err());
        assert!(backend.assign_mesh(Handle(7), MeshKind::Cube).is_err());
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_mesh_and_material_recorded_as_assets() {
        let mut backend = RecordingBackend::new();
        let handle = backend.spawn("floor", &Transform::identity()).unwrap();
        backend.assign_mesh(handle, MeshKind::Cube).unwrap();
        backend.assign_material(handle, 0, MaterialKind::Floor).unwrap();
        backend.assign_material(handle, 1, MaterialKind::Wood).unwrap();

        assert_eq!(
            &backend.calls()[1..],
            &[
                BackendCall::AssignMesh {
                    handle,
                    asset: "/Engine/BasicShapes/Cube.Cube"
                },
                BackendCall::AssignMaterial {
                    handle,
                    slot: 0,
                    asset: "/Engine/EngineMaterials/WorldGridMaterial.WorldGridMaterial"
                },
                BackendCall::AssignMaterial {
                    handle,
                    slot: 1,
                    asset: "/Engine/EngineMaterials/DefaultMaterial.DefaultMaterial"
                },
            ]
        );
    }
}
