//! Scene description pipeline
//!
//! validate -> defaults -> adjacency -> resolve -> expand -> build

pub mod adjacency;
pub mod builder;
pub mod catalog;
pub mod composite;
pub mod config;
pub mod defaults;
pub mod document;
pub mod graph;
pub mod manager;
pub mod node;
pub mod report;
pub mod validate;

pub use adjacency::{Connection, connect_rooms};
pub use builder::{ResolvedRoom, SceneGraph, SceneGraphBuilder, Slab, SlabKind};
pub use catalog::{Catalog, Category, ObjectDesign};
pub use composite::{CompositeExpander, ExpandedComposite, Expansion};
pub use config::SceneConfig;
pub use defaults::apply_defaults;
pub use document::{Doorway, MaterialKind, MeshKind, ObjectSpec, RoomSpec, SceneDocument};
pub use graph::{ResolvedObject, Resolution, SceneIndex, TransformResolver};
pub use manager::{SceneBuild, SceneManager};
pub use node::{Attachment, LightSpec, NodeKind, ObjectId, ParentRef, RoomId, Rotation, SceneNode, Transform};
pub use report::{BuildReport, GeometryWarning, ReferenceError};
pub use validate::{ValidationIssue, validate, validate_strict};
