//! Mesh data, the renderer component, and the path-keyed mesh cache.
//!
//! A [`MeshRenderer`] deserializes as a relative path only; the scene
//! load pass resolves it to shared mesh data through the cache. The
//! importer sits behind a trait so the file format backend can be
//! swapped (and so tests can count invocations).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Vec2, Vec3};
use log::{debug, warn};

use crate::error::AssetError;

/// A single mesh vertex: position, texture coordinates, normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Degenerate box containing a single point.
    pub fn at_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Expand the box to contain `p`.
    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Min/max over a point set. Empty input yields a box at the origin.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut iter = points.iter();
        let Some(&first) = iter.next() else {
            return Self::at_point(Vec3::ZERO);
        };
        let mut bb = Self::at_point(first);
        for &p in iter {
            bb.grow(p);
        }
        bb
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Raw geometry handed over by a [`MeshImporter`]. Normals and UVs may
/// be empty when the source lacks them.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// Resolved, buffer-backed mesh geometry shared between objects.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
}

impl Mesh {
    /// Build a mesh from imported geometry, computing the bounding box
    /// incrementally per vertex. Importers use a bottom-left UV origin,
    /// so v is flipped here.
    pub fn from_data(data: MeshData) -> Self {
        let mut bounds = data
            .positions
            .first()
            .map(|&p| BoundingBox::at_point(p))
            .unwrap_or_else(|| BoundingBox::at_point(Vec3::ZERO));

        let vertices = data
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                bounds.grow(position);
                Vertex {
                    position,
                    uv: data
                        .uvs
                        .get(i)
                        .map(|uv| Vec2::new(uv.x, 1.0 - uv.y))
                        .unwrap_or(Vec2::ZERO),
                    normal: data.normals.get(i).copied().unwrap_or(Vec3::ZERO),
                }
            })
            .collect();

        Self {
            vertices,
            indices: data.indices,
            bounds,
        }
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Unit cube centered on the origin, used when the editor spawns a
    /// primitive object without a mesh asset.
    pub fn unit_cube() -> Self {
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];
        const CORNER_UVS: [Vec2; 4] = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, tangent, bitangent) in FACES {
            let base = vertices.len() as u32;
            for (corner, uv) in [
                (-tangent - bitangent, CORNER_UVS[0]),
                (tangent - bitangent, CORNER_UVS[1]),
                (tangent + bitangent, CORNER_UVS[2]),
                (-tangent + bitangent, CORNER_UVS[3]),
            ] {
                vertices.push(Vertex {
                    position: (normal + corner) * 0.5,
                    uv,
                    normal,
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            bounds: BoundingBox {
                min: Vec3::splat(-0.5),
                max: Vec3::splat(0.5),
            },
            vertices,
            indices,
        }
    }
}

/// Resolution state of a [`MeshRenderer`].
#[derive(Debug, Clone, Default)]
pub enum MeshState {
    /// Post-deserialization: only the relative path is known.
    #[default]
    Unresolved,
    /// Geometry loaded and cached.
    Resolved(Arc<Mesh>),
}

/// Renders a mesh asset referenced by relative path.
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    path: String,
    state: MeshState,
}

impl MeshRenderer {
    /// A renderer in the unresolved state.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: MeshState::Unresolved,
        }
    }

    pub fn from_mesh(path: impl Into<String>, mesh: Arc<Mesh>) -> Self {
        Self {
            path: path.into(),
            state: MeshState::Resolved(mesh),
        }
    }

    /// Relative path to the mesh source asset.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mesh(&self) -> Option<&Arc<Mesh>> {
        match &self.state {
            MeshState::Resolved(mesh) => Some(mesh),
            MeshState::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, MeshState::Resolved(_))
    }

    /// Install resolved geometry (the once-per-load transition).
    pub fn set_mesh(&mut self, mesh: Arc<Mesh>) {
        self.state = MeshState::Resolved(mesh);
    }

    /// Drop the geometry reference, returning to the unresolved state.
    pub(crate) fn release(&mut self) {
        self.state = MeshState::Unresolved;
    }
}

/// Mesh-import collaborator: given a source file, produce the first
/// sub-mesh's geometry.
pub trait MeshImporter {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError>;
}

/// Wavefront OBJ importer backed by `tobj`.
#[derive(Debug, Default)]
pub struct ObjImporter;

impl MeshImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<MeshData, AssetError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|e| AssetError::ImportFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Only the first sub-mesh is used; multi-part assets are split
        // into sub-items by the asset browser instead.
        let model = models.into_iter().next().ok_or_else(|| AssetError::ImportFailed {
            path: path.to_path_buf(),
            reason: "no mesh in file".into(),
        })?;

        let mesh = model.mesh;
        Ok(MeshData {
            positions: mesh
                .positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect(),
            normals: mesh
                .normals
                .chunks_exact(3)
                .map(|n| Vec3::new(n[0], n[1], n[2]))
                .collect(),
            uvs: mesh
                .texcoords
                .chunks_exact(2)
                .map(|t| Vec2::new(t[0], t[1]))
                .collect(),
            indices: mesh.indices,
        })
    }
}

/// Session-wide cache of resolved meshes, keyed by relative path.
///
/// Entries are never invalidated within a session; there is no hot
/// reload.
#[derive(Default)]
pub struct MeshCache {
    meshes: HashMap<String, Arc<Mesh>>,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn get(&self, relative_path: &str) -> Option<&Arc<Mesh>> {
        self.meshes.get(relative_path)
    }

    /// Insert a mesh under a path key directly (primitives, tests).
    pub fn insert(&mut self, relative_path: impl Into<String>, mesh: Mesh) -> Arc<Mesh> {
        let mesh = Arc::new(mesh);
        self.meshes.insert(relative_path.into(), Arc::clone(&mesh));
        mesh
    }

    /// Look up `relative_path`, importing through `importer` on a miss.
    ///
    /// The importer is only invoked on the first resolution of a path;
    /// later calls return the identical cached instance.
    pub fn resolve(
        &mut self,
        relative_path: &str,
        base_path: &Path,
        importer: &dyn MeshImporter,
    ) -> Result<Arc<Mesh>, AssetError> {
        if let Some(mesh) = self.meshes.get(relative_path) {
            return Ok(Arc::clone(mesh));
        }

        let full: PathBuf = base_path.join(relative_path);
        if !full.exists() {
            return Err(AssetError::MissingAsset(full));
        }

        debug!("importing mesh {:?}", full);
        let data = importer.import(&full)?;
        if data.positions.is_empty() {
            warn!("mesh {:?} has no vertices", full);
        }
        let mesh = Arc::new(Mesh::from_data(data));
        self.meshes
            .insert(relative_path.to_string(), Arc::clone(&mesh));
        Ok(mesh)
    }
}
