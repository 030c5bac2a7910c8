//! Asset directory tree for the browser panel.
//!
//! A scan walks the project's asset root recursively and classifies
//! files by extension. Mesh files additionally list their named
//! sub-meshes as child entries, so multi-part models can be browsed
//! without opening them. Scans can run on a worker thread; see
//! [`scanner`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::error::AssetError;

pub mod scanner;

pub use scanner::{spawn_scan, ScanHandle};

/// What a tree entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Folder,
    Mesh,
    /// A named sub-mesh inside a mesh file.
    SubMesh,
    Texture,
    Shader,
    Scene,
    Other,
}

/// One node of the asset tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub name: String,
    /// Path relative to the scanned root. Sub-mesh entries carry their
    /// parent file's path.
    pub relative_path: PathBuf,
    pub kind: AssetKind,
    pub children: Vec<AssetEntry>,
}

impl AssetEntry {
    /// Total number of entries in this subtree, the node included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(AssetEntry::count).sum::<usize>()
    }

    /// Depth-first search by relative path.
    pub fn find(&self, relative_path: &Path) -> Option<&AssetEntry> {
        if self.relative_path == relative_path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(relative_path))
    }
}

/// Classify a file by extension.
pub fn classify(path: &Path) -> AssetKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return AssetKind::Other;
    };
    match ext.to_ascii_lowercase().as_str() {
        "obj" => AssetKind::Mesh,
        "png" | "jpg" | "jpeg" | "bmp" | "tga" => AssetKind::Texture,
        "vert" | "frag" | "glsl" => AssetKind::Shader,
        "scene" => AssetKind::Scene,
        _ => AssetKind::Other,
    }
}

/// Walk `root` and build the asset tree synchronously.
pub fn scan_tree(root: &Path) -> Result<AssetEntry, AssetError> {
    scan_dir(root, PathBuf::new(), &AtomicBool::new(false))
}

pub(crate) fn scan_dir(
    root: &Path,
    relative: PathBuf,
    cancel: &AtomicBool,
) -> Result<AssetEntry, AssetError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(AssetError::ScanCancelled);
    }

    let full = root.join(&relative);
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().into_owned());

    let mut names: Vec<(String, bool)> = Vec::new();
    for entry in std::fs::read_dir(&full)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with('.') {
            continue;
        }
        let is_dir = entry.file_type()?.is_dir();
        names.push((file_name, is_dir));
    }
    // directories first, then files, both alphabetical
    names.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut children = Vec::with_capacity(names.len());
    for (file_name, is_dir) in names {
        let child_rel = relative.join(&file_name);
        if is_dir {
            children.push(scan_dir(root, child_rel, cancel)?);
        } else {
            let kind = classify(Path::new(&file_name));
            let sub_meshes = if kind == AssetKind::Mesh {
                list_sub_meshes(&root.join(&child_rel), &child_rel)
            } else {
                Vec::new()
            };
            children.push(AssetEntry {
                name: file_name,
                relative_path: child_rel,
                kind,
                children: sub_meshes,
            });
        }
    }

    Ok(AssetEntry {
        name,
        relative_path: relative,
        kind: AssetKind::Folder,
        children,
    })
}

/// Named sub-meshes of a mesh file, as browser child entries. Parse
/// failures leave the file childless rather than failing the scan.
fn list_sub_meshes(full_path: &Path, relative: &Path) -> Vec<AssetEntry> {
    let loaded = tobj::load_obj(
        full_path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    );
    let models = match loaded {
        Ok((models, _)) => models,
        Err(e) => {
            debug!("could not list sub-meshes of {:?}: {}", full_path, e);
            return Vec::new();
        }
    };

    models
        .into_iter()
        .filter(|m| !m.name.is_empty())
        .map(|m| AssetEntry {
            name: m.name,
            relative_path: relative.to_path_buf(),
            kind: AssetKind::SubMesh,
            children: Vec::new(),
        })
        .collect()
}
