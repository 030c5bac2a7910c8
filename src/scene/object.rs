//! Scene objects and their collider lifecycle.

use glam::Vec3;
use log::debug;

use crate::physics::{ColliderKind, PhysicsLink, PhysicsWorld};
use crate::scene::material::Material;
use crate::scene::mesh::MeshRenderer;
use crate::scene::transform::Transform;
use crate::scene::ObjectId;

/// An entity in the scene: a named transform with optional renderer,
/// material and collider.
///
/// Objects own no global state; all physics interaction goes through
/// the [`PhysicsWorld`] passed into the methods that need it, and the
/// collider linkage is private so attach/detach stays paired.
#[derive(Debug)]
pub struct GameObject {
    pub(crate) id: ObjectId,
    pub name: String,
    pub transform: Transform,
    /// Static objects are skipped by editor gizmos and selection; they
    /// may still carry a collider.
    pub is_static: bool,
    /// Mass used when a collider is attached. Changing it does not
    /// retroactively update an attached body.
    pub mass: f32,
    pub renderer: Option<MeshRenderer>,
    pub material: Option<Material>,
    link: Option<PhysicsLink>,
    disposed: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::NULL,
            name: name.into(),
            transform: Transform::IDENTITY,
            is_static: false,
            mass: 1.0,
            renderer: None,
            material: None,
            link: None,
            disposed: false,
        }
    }

    pub fn at_position(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            ..Self::new(name)
        }
    }

    /// Handle assigned when the object was added to a scene, or
    /// [`ObjectId::NULL`] before that.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn physics_link(&self) -> Option<&PhysicsLink> {
        self.link.as_ref()
    }

    pub fn has_collider(&self) -> bool {
        self.link.is_some()
    }

    /// Attach a collision shape, replacing any existing one. The old
    /// registration is always released first, so re-attaching the same
    /// kind resets the body at the object's current position.
    ///
    /// A kind of [`ColliderKind::None`] detaches and attaches nothing.
    pub fn set_collider(&mut self, physics: &mut PhysicsWorld, kind: ColliderKind) {
        if let Some(link) = self.link.take() {
            physics.unregister(link);
        }
        if kind == ColliderKind::None {
            return;
        }
        debug_assert!(self.link.is_none());
        let link = physics.register(kind, self.mass, self.transform.position);
        debug!("attached {:?} collider to '{}'", kind, self.name);
        self.link = Some(link);
    }

    /// Detach the collider if one is attached. Safe to call repeatedly.
    pub fn remove_collider(&mut self, physics: &mut PhysicsWorld) {
        if let Some(link) = self.link.take() {
            physics.unregister(link);
        }
    }

    /// Overwrite the transform's position and rotation with the
    /// simulated body pose. No-op without a collider or with a stale
    /// handle; scale is untouched.
    pub(crate) fn sync_from_physics(&mut self, physics: &PhysicsWorld) {
        let Some(link) = &self.link else {
            return;
        };
        if let Some((position, rotation)) = physics.body_pose(link.body) {
            self.transform.position = position;
            self.transform.rotation = rotation;
        }
    }

    /// Release everything the object holds: collider registration and
    /// mesh reference. Idempotent; a disposed object stays usable as
    /// plain data but is skipped by scene operations.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        if self.disposed {
            return;
        }
        self.remove_collider(physics);
        if let Some(renderer) = &mut self.renderer {
            renderer.release();
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_collider_registers_body_at_object_position() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::at_position("crate", Vec3::new(0.0, 3.0, 0.0));

        obj.set_collider(&mut physics, ColliderKind::Cube);
        assert!(obj.has_collider());
        assert_eq!(physics.body_count(), 1);

        let link = obj.physics_link().unwrap();
        let (pos, _) = physics.body_pose(link.body).unwrap();
        assert_eq!(pos, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn replacing_collider_releases_the_old_registration() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::new("ball");

        obj.set_collider(&mut physics, ColliderKind::Cube);
        let old_body = obj.physics_link().unwrap().body;

        obj.set_collider(&mut physics, ColliderKind::Sphere);
        assert_eq!(physics.body_count(), 1);
        assert!(physics.body_pose(old_body).is_none());
        assert_eq!(obj.physics_link().unwrap().kind, ColliderKind::Sphere);
    }

    #[test]
    fn none_kind_detaches() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::new("ball");

        obj.set_collider(&mut physics, ColliderKind::Sphere);
        obj.set_collider(&mut physics, ColliderKind::None);
        assert!(!obj.has_collider());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn remove_collider_is_idempotent() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::new("ball");

        obj.set_collider(&mut physics, ColliderKind::Cube);
        obj.remove_collider(&mut physics);
        obj.remove_collider(&mut physics);
        assert!(!obj.has_collider());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn sync_overwrites_position_and_rotation_only() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::at_position("crate", Vec3::new(0.0, 10.0, 0.0));
        obj.transform.scale = Vec3::splat(2.0);
        obj.set_collider(&mut physics, ColliderKind::Cube);

        physics.step(1.0 / 30.0);
        obj.sync_from_physics(&physics);

        assert!(obj.transform.position.y < 10.0);
        assert_eq!(obj.transform.scale, Vec3::splat(2.0));
    }

    #[test]
    fn sync_without_collider_leaves_transform_alone() {
        let physics = PhysicsWorld::new();
        let mut obj = GameObject::at_position("prop", Vec3::new(1.0, 2.0, 3.0));
        obj.sync_from_physics(&physics);
        assert_eq!(obj.transform.position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn dispose_releases_collider_and_mesh() {
        let mut physics = PhysicsWorld::new();
        let mut obj = GameObject::new("crate");
        obj.renderer = Some(MeshRenderer::from_mesh(
            "models/crate.obj",
            std::sync::Arc::new(crate::scene::mesh::Mesh::unit_cube()),
        ));
        obj.set_collider(&mut physics, ColliderKind::Cube);

        obj.dispose(&mut physics);
        assert!(obj.is_disposed());
        assert!(!obj.has_collider());
        assert!(!obj.renderer.as_ref().unwrap().is_resolved());
        assert_eq!(physics.body_count(), 0);

        // second dispose is a no-op
        obj.dispose(&mut physics);
        assert!(obj.is_disposed());
    }
}
