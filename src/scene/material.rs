//! Material, shader and texture references.
//!
//! These carry relative asset paths and construction flags only; GPU
//! handles are derived by the renderer after load and never serialized.

/// Reference to a shader program by its source paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderRef {
    pub vertex_path: String,
    pub fragment_path: String,
}

impl ShaderRef {
    pub fn new(vertex_path: impl Into<String>, fragment_path: impl Into<String>) -> Self {
        Self {
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
        }
    }
}

/// Reference to a 2D texture asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    pub path: String,
    /// Whether mipmaps are generated when the texture is uploaded.
    pub generate_mipmaps: bool,
}

impl TextureRef {
    pub fn new(path: impl Into<String>, generate_mipmaps: bool) -> Self {
        Self {
            path: path.into(),
            generate_mipmaps,
        }
    }
}

/// Surface description for a scene object.
///
/// Every slot is independently optional; the wire format records each
/// slot's presence with an explicit flag rather than inferring it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Material {
    pub shader: Option<ShaderRef>,
    pub diffuse: Option<TextureRef>,
    pub normal: Option<TextureRef>,
    pub specular: Option<TextureRef>,
}

impl Material {
    pub fn with_shader(shader: ShaderRef) -> Self {
        Self {
            shader: Some(shader),
            ..Default::default()
        }
    }
}
