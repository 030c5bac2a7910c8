//! Scene-editing core: scene graph, binary persistence, and physics
//! synchronization.
//!
//! The crate is the engine side of a level editor, with no rendering or
//! UI of its own:
//!
//! - [`scene`] — the scene container, objects, transforms, materials,
//!   meshes, and the binary wire format they persist through
//! - [`physics`] — rigid-body simulation and the collider lifecycle
//! - [`context`] — session state tying the open scene, mesh cache and
//!   physics world together
//! - [`assets`] — asset directory scanning for the browser panel
//! - [`codec`] / [`compress`] — the low-level byte format and the
//!   compressed file container
//!
//! Scene files are LZ4-compressed binary; see [`compress`] for the
//! container header and [`scene::serial`] for the payload layout.

pub mod assets;
pub mod codec;
pub mod compress;
pub mod context;
pub mod error;
pub mod physics;
pub mod scene;

pub use context::EditorContext;
pub use error::{AssetError, SceneError};
pub use physics::{ColliderKind, PhysicsWorld};
pub use scene::{GameObject, Material, MeshRenderer, ObjectId, Scene, Transform};
