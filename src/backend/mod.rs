//! Rendering backend boundary and two-phase emission.
//!
//! Phase one creates every room slab and every node on its own, recording a
//! handle per node id. Phase two wires attachment edges between recorded
//! handles. A failure in either phase is recorded against the one room or
//! node it belongs to and emission carries on with the rest.

pub mod recording;

use std::collections::HashMap;

use thiserror::Error;

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::scene::{Attachment, MaterialKind, MeshKind, NodeKind, SceneGraph, SceneNode, Transform};

pub use recording::{BackendCall, RecordingBackend};

/// Opaque reference to a spawned actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(pub u64);

/// A single failed backend operation.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{operation} failed for '{label}': {reason}")]
pub struct BackendError {
    pub operation: &'static str,
    pub label: String,
    pub reason: String,
}

impl BackendError {
    pub fn new(operation: &'static str, label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation,
            label: label.into(),
            reason: reason.into(),
        }
    }
}

/// Engine operations needed to realize a scene graph.
pub trait RenderBackend {
    fn open_level(&mut self, map: &str) -> std::result::Result<(), BackendError>;

    /// Spawn an actor with no mesh at a world transform.
    fn spawn(&mut self, label: &str, transform: &Transform) -> std::result::Result<Handle, BackendError>;

    fn assign_mesh(&mut self, handle: Handle, mesh: MeshKind) -> std::result::Result<(), BackendError>;

    fn assign_material(
        &mut self,
        handle: Handle,
        slot: usize,
        material: MaterialKind,
    ) -> std::result::Result<(), BackendError>;

    fn attach(&mut self, child: Handle, parent: Handle, keep_relative: bool) -> std::result::Result<(), BackendError>;

    fn set_relative_location(&mut self, handle: Handle, location: Vec3) -> std::result::Result<(), BackendError>;

    fn create_light(
        &mut self,
        label: &str,
        transform: &Transform,
        intensity: f32,
        color: Vec3,
    ) -> std::result::Result<Handle, BackendError>;

    fn save_level(&mut self, map: &str) -> std::result::Result<(), BackendError>;
}

/// Emission phase a failure happened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Create,
    Attach,
}

/// A room or node that could not be (fully) realized.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("{subject} ({phase:?}): {reason}")]
pub struct BackendFailure {
    pub subject: String,
    pub phase: Phase,
    pub reason: String,
}

/// Outcome of an emission run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmitSummary {
    pub spawned: usize,
    pub lights: usize,
    pub attached: usize,
    pub failures: Vec<BackendFailure>,
}

impl EmitSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, subject: &str, phase: Phase, reason: impl ToString) {
        let failure = BackendFailure {
            subject: subject.to_string(),
            phase,
            reason: reason.to_string(),
        };
        log::error!("Backend failure: {}", failure);
        self.failures.push(failure);
    }
}

/// Realize a scene graph through a backend.
///
/// Only opening and saving the level are fatal; everything else is isolated
/// per room or node and reported in the summary.
pub fn emit<B: RenderBackend + ?Sized>(graph: &SceneGraph, backend: &mut B) -> Result<EmitSummary> {
    backend
        .open_level(&graph.map)
        .map_err(|e| Error::Backend(e.to_string()))?;

    let mut summary = EmitSummary::default();
    let mut handles: HashMap<&str, Handle> = HashMap::new();

    for room in &graph.rooms {
        for slab in &room.slabs {
            let label = format!("{}_{}", room.name, slab.kind.suffix());
            let created = backend.spawn(&label, &slab.transform).and_then(|handle| {
                backend.assign_mesh(handle, slab.design.mesh)?;
                backend.assign_material(handle, 0, slab.design.material)
            });
            match created {
                Ok(()) => summary.spawned += 1,
                Err(e) => summary.fail(&room.name, Phase::Create, e),
            }
        }
    }

    for node in &graph.nodes {
        match create_node(backend, node) {
            Ok(created) => {
                handles.insert(&node.id, created.handle);
                summary.spawned += usize::from(!created.is_light);
                summary.lights += usize::from(created.is_light) + created.extra_lights;
                if let Some(e) = created.partial {
                    summary.fail(&node.id, Phase::Create, e);
                }
            }
            Err(e) => summary.fail(&node.id, Phase::Create, e),
        }
    }

    for node in &graph.nodes {
        // Rooms are not spawned as attachable handles.
        let Attachment::Node(parent) = &node.attachment else {
            continue;
        };
        let Some(&child) = handles.get(node.id.as_str()) else {
            continue;
        };
        let Some(&parent_handle) = handles.get(parent.as_str()) else {
            summary.fail(&node.id, Phase::Attach, format!("parent '{}' was not created", parent));
            continue;
        };

        let attached = backend
            .attach(child, parent_handle, true)
            .and_then(|_| backend.set_relative_location(child, node.local.position));
        match attached {
            Ok(()) => summary.attached += 1,
            Err(e) => summary.fail(&node.id, Phase::Attach, e),
        }
    }

    backend
        .save_level(&graph.map)
        .map_err(|e| Error::Backend(e.to_string()))?;

    log::info!(
        "Emitted {} actors, {} lights, {} attachments ({} failures)",
        summary.spawned,
        summary.lights,
        summary.attached,
        summary.failures.len()
    );
    Ok(summary)
}

struct Created {
    handle: Handle,
    is_light: bool,
    extra_lights: usize,
    /// A step after the spawn failed; the actor exists and keeps its handle
    partial: Option<BackendError>,
}

fn create_node<B: RenderBackend + ?Sized>(
    backend: &mut B,
    node: &SceneNode,
) -> std::result::Result<Created, BackendError> {
    if let NodeKind::Light { intensity, color } = node.kind {
        let handle = backend.create_light(&node.id, &node.world, intensity, color)?;
        return Ok(Created {
            handle,
            is_light: true,
            extra_lights: 0,
            partial: None,
        });
    }

    let handle = backend.spawn(&node.id, &node.world)?;
    let mut created = Created {
        handle,
        is_light: false,
        extra_lights: 0,
        partial: None,
    };

    if let Some(design) = &node.design {
        let styled = backend
            .assign_mesh(handle, design.mesh)
            .and_then(|_| backend.assign_material(handle, 0, design.material));
        created.partial = styled.err();
    }

    if let Some(light) = node.light {
        let at = node.world.translated(light.offset);
        match backend.create_light(&format!("{}_Light", node.id), &at, light.intensity, light.color) {
            Ok(_) => created.extra_lights = 1,
            Err(e) => created.partial = created.partial.or(Some(e)),
        }
    }

    Ok(created)
}
