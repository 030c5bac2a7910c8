//! Scene save/load: compression wrapper plus mesh resolution.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::compress::{self, Method};
use crate::error::SceneError;
use crate::scene::mesh::{MeshCache, MeshImporter};
use crate::scene::{serial, Scene};

/// Serialize, compress and write a scene to `path`.
///
/// The bytes go to a sibling temp file first and are renamed into
/// place, so a crash mid-write leaves the previous file intact.
pub fn save_scene(scene: &Scene, path: &Path) -> Result<(), SceneError> {
    let payload = serial::serialize_scene(scene);
    let packed = compress::zip(&payload, Method::default());

    let tmp = path.with_extension("scene.tmp");
    fs::write(&tmp, &packed)?;
    fs::rename(&tmp, path)?;

    info!(
        "saved scene to {:?} ({} objects, {} -> {} bytes)",
        path,
        scene.len(),
        payload.len(),
        packed.len()
    );
    Ok(())
}

/// Read, decompress and deserialize a scene from `path`, then resolve
/// its mesh references against `base_path` through the cache.
///
/// Decode failures abort the whole load; a mesh that cannot be resolved
/// does not. Such objects keep an unresolved renderer and are reported
/// via the log.
pub fn load_scene(
    path: &Path,
    base_path: &Path,
    cache: &mut MeshCache,
    importer: &dyn MeshImporter,
) -> Result<Scene, SceneError> {
    let packed = fs::read(path)?;
    let payload = compress::unzip(&packed)?;
    let mut scene = serial::deserialize_scene(&payload)?;

    let resolved = resolve_meshes(&mut scene, base_path, cache, importer);
    info!(
        "loaded scene from {:?} ({} objects, {} meshes resolved)",
        path,
        scene.len(),
        resolved
    );
    Ok(scene)
}

/// Resolve every unresolved renderer in the scene, returning how many
/// were resolved in this pass.
pub fn resolve_meshes(
    scene: &mut Scene,
    base_path: &Path,
    cache: &mut MeshCache,
    importer: &dyn MeshImporter,
) -> usize {
    let mut resolved = 0;
    for object in scene.objects_mut() {
        let Some(renderer) = &mut object.renderer else {
            continue;
        };
        if renderer.is_resolved() || renderer.path().is_empty() {
            continue;
        }
        match cache.resolve(renderer.path(), base_path, importer) {
            Ok(mesh) => {
                renderer.set_mesh(mesh);
                resolved += 1;
            }
            Err(e) => warn!("object '{}': {}", object.name, e),
        }
    }
    resolved
}
