//! Editor session state: the open scene, the mesh cache, the physics
//! world, and the operations that tie them together.
//!
//! There is no global current scene; everything that needs one takes
//! it from a context. Scene switches are transactional: the new scene
//! is only installed after the old one is fully closed, and a failed
//! load leaves the open scene untouched.

use std::io;
use std::path::Path;

use log::debug;

use crate::error::SceneError;
use crate::physics::{ColliderKind, PhysicsWorld};
use crate::scene::mesh::{MeshCache, MeshImporter, ObjImporter};
use crate::scene::{persist, GameObject, ObjectId, Scene};

pub struct EditorContext {
    scene: Option<Scene>,
    pub meshes: MeshCache,
    importer: Box<dyn MeshImporter>,
    pub physics: PhysicsWorld,
}

impl EditorContext {
    pub fn new() -> Self {
        Self::with_importer(Box::new(ObjImporter))
    }

    /// A context with a custom mesh importer backend.
    pub fn with_importer(importer: Box<dyn MeshImporter>) -> Self {
        Self {
            scene: None,
            meshes: MeshCache::new(),
            importer,
            physics: PhysicsWorld::new(),
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Install `scene` as the open scene, closing the previous one
    /// first so its physics registrations are released.
    pub fn set_scene(&mut self, scene: Scene) -> &mut Scene {
        self.close_scene();
        debug!("opening scene with {} objects", scene.len());
        self.scene.insert(scene)
    }

    /// Close the open scene, if any, releasing all of its resources.
    pub fn close_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.close(&mut self.physics);
        }
    }

    /// Load a scene from disk and install it. On any failure the
    /// currently open scene stays as it was.
    pub fn load_scene(&mut self, path: &Path, base_path: &Path) -> Result<(), SceneError> {
        let scene = persist::load_scene(path, base_path, &mut self.meshes, self.importer.as_ref())?;
        self.set_scene(scene);
        Ok(())
    }

    /// Save the open scene to disk.
    pub fn save_scene(&self, path: &Path) -> Result<(), SceneError> {
        let Some(scene) = &self.scene else {
            return Err(SceneError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "no scene is open",
            )));
        };
        persist::save_scene(scene, path)
    }

    /// Advance the simulation and copy the resulting poses back into
    /// the scene. One call per frame.
    pub fn tick(&mut self, delta_time: f32) {
        self.physics.step(delta_time);
        if let Some(scene) = &mut self.scene {
            scene.sync_physics(&self.physics);
        }
    }

    /// Attach, replace or detach (`ColliderKind::None`) the collider
    /// of an object in the open scene. Returns false for a stale
    /// handle or when no scene is open.
    pub fn set_collider(&mut self, id: ObjectId, kind: ColliderKind) -> bool {
        let Some(scene) = &mut self.scene else {
            return false;
        };
        let Some(object) = scene.get_mut(id) else {
            return false;
        };
        object.set_collider(&mut self.physics, kind);
        true
    }

    /// Add an object to the open scene. Returns [`ObjectId::NULL`]
    /// when no scene is open.
    pub fn add_object(&mut self, object: GameObject) -> ObjectId {
        match &mut self.scene {
            Some(scene) => scene.add_object(object),
            None => ObjectId::NULL,
        }
    }

    /// Remove an object from the open scene, releasing its resources.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        match &mut self.scene {
            Some(scene) => scene.remove_object(id, &mut self.physics),
            None => false,
        }
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh::MeshRenderer;
    use glam::Vec3;

    #[test]
    fn set_scene_closes_the_previous_one() {
        let mut ctx = EditorContext::new();

        let mut first = Scene::new();
        let id = first.add_object(GameObject::new("a"));
        ctx.set_scene(first);
        assert!(ctx.set_collider(id, ColliderKind::Cube));
        assert_eq!(ctx.physics.body_count(), 1);

        ctx.set_scene(Scene::new());
        // old scene's registration released by the switch
        assert_eq!(ctx.physics.body_count(), 0);
        assert!(ctx.scene().unwrap().is_empty());
    }

    #[test]
    fn failed_load_keeps_open_scene() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.scene");
        std::fs::write(&bad, b"garbage").unwrap();

        let mut ctx = EditorContext::new();
        let mut scene = Scene::new();
        scene.add_object(GameObject::new("keep-me"));
        ctx.set_scene(scene);

        assert!(ctx.load_scene(&bad, dir.path()).is_err());
        assert_eq!(ctx.scene().unwrap().len(), 1);
        assert_eq!(ctx.scene().unwrap().objects()[0].name, "keep-me");
    }

    #[test]
    fn save_and_load_through_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.scene");

        let mut ctx = EditorContext::new();
        let mut scene = Scene::new();
        scene.add_object(GameObject::at_position("a", Vec3::X));
        ctx.set_scene(scene);
        ctx.save_scene(&path).unwrap();

        let mut ctx = EditorContext::new();
        ctx.load_scene(&path, dir.path()).unwrap();
        assert_eq!(ctx.scene().unwrap().len(), 1);
    }

    #[test]
    fn save_without_scene_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = EditorContext::new();
        assert!(ctx.save_scene(&dir.path().join("x.scene")).is_err());
    }

    #[test]
    fn tick_moves_collided_objects() {
        let mut ctx = EditorContext::new();
        let mut scene = Scene::new();
        let id = scene.add_object(GameObject::at_position("crate", Vec3::new(0.0, 10.0, 0.0)));
        ctx.set_scene(scene);
        ctx.set_collider(id, ColliderKind::Cube);

        for _ in 0..30 {
            ctx.tick(1.0 / 60.0);
        }

        let y = ctx.scene().unwrap().get(id).unwrap().transform.position.y;
        assert!(y < 10.0, "expected object to fall, y = {y}");
    }

    #[test]
    fn remove_object_releases_physics() {
        let mut ctx = EditorContext::new();
        let mut scene = Scene::new();
        let id = scene.add_object(GameObject::new("crate"));
        ctx.set_scene(scene);
        ctx.set_collider(id, ColliderKind::Sphere);
        assert_eq!(ctx.physics.body_count(), 1);

        assert!(ctx.remove_object(id));
        assert_eq!(ctx.physics.body_count(), 0);
        assert!(!ctx.set_collider(id, ColliderKind::Cube));
    }

    #[test]
    fn operations_without_scene_fail_cleanly() {
        let mut ctx = EditorContext::new();
        assert!(!ctx.has_scene());
        assert_eq!(ctx.add_object(GameObject::new("x")), ObjectId::NULL);
        assert!(!ctx.remove_object(ObjectId::NULL));
        assert!(!ctx.set_collider(ObjectId::NULL, ColliderKind::Cube));
        ctx.tick(1.0 / 60.0);
        ctx.close_scene();
    }

    #[test]
    fn close_scene_releases_mesh_references() {
        let mut ctx = EditorContext::new();
        let mesh = ctx.meshes.insert("models/cube.obj", crate::scene::Mesh::unit_cube());

        let mut scene = Scene::new();
        let mut object = GameObject::new("crate");
        object.renderer = Some(MeshRenderer::from_mesh("models/cube.obj", mesh));
        scene.add_object(object);
        ctx.set_scene(scene);

        ctx.close_scene();
        assert!(!ctx.has_scene());
        // cache keeps its entry for the session
        assert_eq!(ctx.meshes.len(), 1);
    }
}
