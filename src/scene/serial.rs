//! Scene and object wire serialization.
//!
//! Field order is fixed and identical on both sides; every optional
//! component is preceded by a one-byte presence flag. The scene block
//! is ambient lighting, an object count, then the objects back to back.
//! Decoding is all-or-nothing: any failure aborts the whole load and
//! nothing partial escapes.
//!
//! Runtime-only state (object handles, collider registrations, resolved
//! mesh data, the static flag) is not part of the format. Renderers
//! decode into the unresolved state and are resolved afterwards by the
//! load pass in [`persist`](crate::scene::persist).

use crate::codec::{Decoder, Encoder};
use crate::error::SceneError;
use crate::scene::material::{Material, ShaderRef, TextureRef};
use crate::scene::mesh::MeshRenderer;
use crate::scene::object::GameObject;
use crate::scene::Scene;

/// Upper bound on the decoded object count. A corrupt count fails fast
/// here instead of stalling in the object loop.
const MAX_OBJECTS: i32 = 100_000;

/// Encode a scene into wire bytes.
pub fn serialize_scene(scene: &Scene) -> Vec<u8> {
    let mut enc = Encoder::with_capacity(64 * scene.len() + 32);
    enc.put_f32(scene.ambient_strength);
    enc.put_vec3(scene.ambient_color);
    enc.put_i32(scene.len() as i32);
    for object in scene.objects() {
        write_object(&mut enc, object);
    }
    enc.into_bytes()
}

/// Decode a scene from wire bytes. Trailing bytes after the last
/// object are treated as corruption.
pub fn deserialize_scene(bytes: &[u8]) -> Result<Scene, SceneError> {
    let mut dec = Decoder::new(bytes);

    let mut scene = Scene::new();
    scene.ambient_strength = dec.take_f32()?;
    scene.ambient_color = dec.take_vec3()?;

    let at = dec.position();
    let count = dec.take_i32()?;
    if !(0..=MAX_OBJECTS).contains(&count) {
        return Err(SceneError::corrupt(
            at,
            format!("implausible object count {count}"),
        ));
    }

    for _ in 0..count {
        let object = read_object(&mut dec)?;
        scene.add_object(object);
    }

    if dec.remaining() != 0 {
        return Err(SceneError::corrupt(
            dec.position(),
            format!("{} trailing bytes after last object", dec.remaining()),
        ));
    }

    Ok(scene)
}

/// Encode one object: name, transform, then flagged optional parts.
pub fn write_object(enc: &mut Encoder, object: &GameObject) {
    enc.put_str(&object.name);
    enc.put_vec3(object.transform.position);
    enc.put_quat(object.transform.rotation);
    enc.put_vec3(object.transform.scale);

    enc.put_bool(object.renderer.is_some());
    if let Some(renderer) = &object.renderer {
        enc.put_str(renderer.path());
    }

    enc.put_bool(object.material.is_some());
    if let Some(material) = &object.material {
        write_material(enc, material);
    }
}

/// Decode one object. The result carries no runtime state: no handle,
/// no collider, an unresolved renderer.
pub fn read_object(dec: &mut Decoder) -> Result<GameObject, SceneError> {
    let mut object = GameObject::new(dec.take_str()?);
    object.transform.position = dec.take_vec3()?;
    object.transform.rotation = dec.take_quat()?;
    object.transform.scale = dec.take_vec3()?;

    if dec.take_bool()? {
        object.renderer = Some(MeshRenderer::new(dec.take_str()?));
    }
    if dec.take_bool()? {
        object.material = Some(read_material(dec)?);
    }

    Ok(object)
}

fn write_material(enc: &mut Encoder, material: &Material) {
    enc.put_bool(material.shader.is_some());
    if let Some(shader) = &material.shader {
        enc.put_str(&shader.vertex_path);
        enc.put_str(&shader.fragment_path);
    }

    for slot in [&material.diffuse, &material.normal, &material.specular] {
        enc.put_bool(slot.is_some());
        if let Some(texture) = slot {
            enc.put_str(&texture.path);
            enc.put_bool(texture.generate_mipmaps);
        }
    }
}

fn read_material(dec: &mut Decoder) -> Result<Material, SceneError> {
    let mut material = Material::default();

    if dec.take_bool()? {
        material.shader = Some(ShaderRef {
            vertex_path: dec.take_str()?,
            fragment_path: dec.take_str()?,
        });
    }

    for slot in [
        &mut material.diffuse,
        &mut material.normal,
        &mut material.specular,
    ] {
        if dec.take_bool()? {
            *slot = Some(TextureRef {
                path: dec.take_str()?,
                generate_mipmaps: dec.take_bool()?,
            });
        }
    }

    Ok(material)
}
