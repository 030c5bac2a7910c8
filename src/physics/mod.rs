//! Rigid-body simulation wrapper.
//!
//! Wraps rapier3d behind the small surface the editor needs: register a
//! shape+body pair for an object, unregister it, query the simulated
//! pose, and advance the simulation on a fixed timestep. The body and
//! collider tables in here are the sole authority for simulated
//! geometry and pose; scene objects hold handles into them, never
//! copies, and only mutate them through this module.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;

pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};

/// Simulation timestep (seconds). Matches the editor's 60 Hz tick.
const TIMESTEP: f32 = 1.0 / 60.0;

/// Upper bound on catch-up substeps per `step` call.
const MAX_SUBSTEPS: u32 = 4;

/// Collision shape attached to a scene object.
///
/// `None` is an explicit request to detach. The editor's primitive
/// shapes use fixed sizes: a 2x2x2 box and a radius-2 sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColliderKind {
    #[default]
    None,
    Cube,
    Sphere,
}

/// A live registration with the simulation: the shape and the dynamic
/// body created for one scene object. Released as a unit.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsLink {
    pub kind: ColliderKind,
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// The physics world: rapier pipeline state plus a fixed-timestep
/// accumulator.
pub struct PhysicsWorld {
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    accumulated_time: f32,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = TIMESTEP;

        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            gravity: rapier::Vector::new(0.0, -9.81, 0.0),
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            accumulated_time: 0.0,
        }
    }

    /// Register a shape and a dynamic body at `position`, returning the
    /// linkage handles. Mass properties derive from `mass`, not from a
    /// density estimate.
    ///
    /// Must not be called for a kind of `None`; callers detach instead.
    pub fn register(&mut self, kind: ColliderKind, mass: f32, position: Vec3) -> PhysicsLink {
        debug_assert!(kind != ColliderKind::None, "cannot register a None collider");

        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .build();
        let body_handle = self.bodies.insert(body);

        let collider = match kind {
            ColliderKind::Cube => rapier::ColliderBuilder::cuboid(1.0, 1.0, 1.0),
            ColliderKind::Sphere => rapier::ColliderBuilder::ball(2.0),
            ColliderKind::None => unreachable!(),
        }
        .mass(mass)
        .build();
        let collider_handle =
            self.colliders
                .insert_with_parent(collider, body_handle, &mut self.bodies);

        PhysicsLink {
            kind,
            body: body_handle,
            collider: collider_handle,
        }
    }

    /// Remove a registration. Collider first, then the body, so nothing
    /// is orphaned if the pair was partially removed before.
    pub fn unregister(&mut self, link: PhysicsLink) {
        self.colliders
            .remove(link.collider, &mut self.islands, &mut self.bodies, false);
        self.bodies.remove(
            link.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Current pose of a body, or `None` for a stale handle.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.bodies.get(handle)?;
        let t = body.translation();
        let r = body.rotation();
        Some((
            Vec3::new(t.x, t.y, t.z),
            Quat::from_xyzw(r.i, r.j, r.k, r.w),
        ))
    }

    /// Move a body. Edits to a simulated object's position must go
    /// through here; direct transform writes are overwritten on the
    /// next sync tick.
    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.set_translation(
                    rapier::Vector::new(position.x, position.y, position.z),
                    true,
                );
                true
            }
            None => false,
        }
    }

    /// Reorient a body.
    pub fn set_body_rotation(&mut self, handle: RigidBodyHandle, rotation: Quat) -> bool {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.set_rotation(
                    UnitQuaternion::from_quaternion(Quaternion::new(
                        rotation.w, rotation.x, rotation.y, rotation.z,
                    )),
                    true,
                );
                true
            }
            None => false,
        }
    }

    /// Advance the simulation, consuming `delta_time` in fixed
    /// sub-steps. Leftover time carries over to the next call.
    pub fn step(&mut self, delta_time: f32) {
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= self.integration_params.dt && steps < MAX_SUBSTEPS {
            self.pipeline.step(
                &self.gravity,
                &self.integration_params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            self.accumulated_time -= self.integration_params.dt;
            steps += 1;
        }
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = rapier::Vector::new(gravity.x, gravity.y, gravity.z);
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_unregister() {
        let mut world = PhysicsWorld::new();
        let link = world.register(ColliderKind::Cube, 1.0, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);

        world.unregister(link);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
    }

    #[test]
    fn body_starts_at_registered_position() {
        let mut world = PhysicsWorld::new();
        let link = world.register(ColliderKind::Sphere, 2.0, Vec3::new(1.0, 2.0, 3.0));
        let (pos, rot) = world.body_pose(link.body).unwrap();
        assert_eq!(pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(rot, Quat::IDENTITY);
    }

    #[test]
    fn gravity_pulls_bodies_down() {
        let mut world = PhysicsWorld::new();
        let link = world.register(ColliderKind::Cube, 1.0, Vec3::new(0.0, 10.0, 0.0));

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let (pos, _) = world.body_pose(link.body).unwrap();
        assert!(pos.y < 10.0, "body should fall, got y = {}", pos.y);
    }

    #[test]
    fn stale_handle_has_no_pose() {
        let mut world = PhysicsWorld::new();
        let link = world.register(ColliderKind::Cube, 1.0, Vec3::ZERO);
        world.unregister(link);
        assert!(world.body_pose(link.body).is_none());
        assert!(!world.set_body_position(link.body, Vec3::ONE));
    }

    #[test]
    fn moved_body_reports_new_pose() {
        let mut world = PhysicsWorld::new();
        let link = world.register(ColliderKind::Cube, 1.0, Vec3::ZERO);
        assert!(world.set_body_position(link.body, Vec3::new(4.0, 5.0, 6.0)));
        let (pos, _) = world.body_pose(link.body).unwrap();
        assert_eq!(pos, Vec3::new(4.0, 5.0, 6.0));
    }
}
