//! Error taxonomy for scene serialization and asset resolution.
//!
//! Scene/codec errors abort the whole load (a scene file is
//! all-or-nothing); asset errors are per-object and recoverable.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while encoding, decoding or persisting a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed wire data: truncated buffer, bad length prefix,
    /// invalid UTF-16 payload.
    #[error("corrupt scene data at byte {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    /// The file does not start with the scene-file magic bytes.
    #[error("not a scene file (bad magic)")]
    BadMagic,

    #[error("unsupported scene format version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown compression method {0}")]
    UnknownCompression(u8),

    /// The declared decompressed size exceeds the sanity cap.
    #[error("declared payload size {0} exceeds limit")]
    PayloadTooLarge(u64),

    #[error("decompression failed: {0}")]
    Decompress(String),
}

impl SceneError {
    pub(crate) fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        SceneError::Corrupt {
            offset,
            reason: reason.into(),
        }
    }
}

/// Errors raised while resolving or scanning assets.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The referenced source file does not exist on disk. Recoverable:
    /// the owning object is left without that resource.
    #[error("asset not found at {0}")]
    MissingAsset(PathBuf),

    /// The source file exists but could not be parsed.
    #[error("failed to import {path}: {reason}")]
    ImportFailed { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The background scan was cancelled before completing.
    #[error("asset scan cancelled")]
    ScanCancelled,
}
