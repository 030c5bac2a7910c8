//! Scene container: an ordered set of objects plus scene-wide state.
//!
//! Objects are addressed by generational [`ObjectId`] handles, so a
//! handle kept across a removal can never alias a later object that
//! reuses the slot. Draw and serialization order is insertion order.

use std::collections::HashSet;

use glam::Vec3;
use log::debug;

use crate::physics::PhysicsWorld;

pub mod material;
pub mod mesh;
pub mod object;
pub mod persist;
pub mod serial;
pub mod transform;

pub use material::{Material, ShaderRef, TextureRef};
pub use mesh::{Mesh, MeshCache, MeshImporter, MeshRenderer, ObjImporter};
pub use object::GameObject;
pub use transform::Transform;

/// Generational handle to an object in a [`Scene`].
///
/// Stale handles (the slot was freed or reused) simply fail lookups;
/// they never panic and never resolve to a different object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Handle that matches nothing in any scene.
    pub const NULL: ObjectId = ObjectId {
        index: u32::MAX,
        generation: u32::MAX,
    };

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// An editable scene: ambient lighting, an ordered object list, and
/// the set of objects flagged as cameras.
pub struct Scene {
    pub ambient_strength: f32,
    pub ambient_color: Vec3,
    objects: Vec<GameObject>,
    generations: Vec<u32>,
    free_slots: Vec<u32>,
    cameras: HashSet<ObjectId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            ambient_strength: 0.5,
            ambient_color: Vec3::ONE,
            objects: Vec::new(),
            generations: Vec::new(),
            free_slots: Vec::new(),
            cameras: HashSet::new(),
        }
    }

    /// Append an object, assigning it a fresh handle. Insertion order
    /// is preserved for iteration and serialization.
    pub fn add_object(&mut self, mut object: GameObject) -> ObjectId {
        let id = self.allocate_id();
        object.id = id;
        self.objects.push(object);
        id
    }

    /// Remove an object, disposing its resources and dropping any
    /// camera flag it carried. Later objects keep their order. Returns
    /// false for a stale or unknown handle.
    pub fn remove_object(&mut self, id: ObjectId, physics: &mut PhysicsWorld) -> bool {
        let Some(pos) = self.objects.iter().position(|o| o.id == id) else {
            return false;
        };
        let mut object = self.objects.remove(pos);
        object.dispose(physics);
        self.cameras.remove(&id);
        self.free_id(id);
        debug!("removed object '{}'", object.name);
        true
    }

    /// Whether `id` still refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        !id.is_null()
            && self
                .generations
                .get(id.index as usize)
                .is_some_and(|&gen| gen == id.generation)
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        if !self.contains(id) {
            return None;
        }
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        if !self.contains(id) {
            return None;
        }
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut GameObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Flag an object as a camera. Fails for stale handles.
    pub fn mark_camera(&mut self, id: ObjectId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.cameras.insert(id)
    }

    pub fn unmark_camera(&mut self, id: ObjectId) -> bool {
        self.cameras.remove(&id)
    }

    pub fn is_camera(&self, id: ObjectId) -> bool {
        self.cameras.contains(&id)
    }

    pub fn cameras(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.cameras.iter().copied()
    }

    /// Copy the simulated pose into the transform of every object with
    /// an attached collider. Called once per tick after the physics
    /// step; while attached, the body pose is authoritative.
    pub fn sync_physics(&mut self, physics: &PhysicsWorld) {
        for object in &mut self.objects {
            object.sync_from_physics(physics);
        }
    }

    /// Dispose every object and empty the scene. All outstanding
    /// handles become stale.
    pub fn close(&mut self, physics: &mut PhysicsWorld) {
        for object in &mut self.objects {
            object.dispose(physics);
        }
        for object in self.objects.drain(..) {
            // free after the dispose pass so ids stay valid during it
            let idx = object.id.index as usize;
            if idx < self.generations.len() {
                self.generations[idx] = self.generations[idx].wrapping_add(1);
                self.free_slots.push(object.id.index);
            }
        }
        self.cameras.clear();
    }

    fn allocate_id(&mut self) -> ObjectId {
        match self.free_slots.pop() {
            Some(index) => ObjectId {
                index,
                generation: self.generations[index as usize],
            },
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                ObjectId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn free_id(&mut self, id: ObjectId) {
        let idx = id.index as usize;
        if idx < self.generations.len() && self.generations[idx] == id.generation {
            self.generations[idx] = self.generations[idx].wrapping_add(1);
            self.free_slots.push(id.index);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
