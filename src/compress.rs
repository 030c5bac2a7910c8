//! Compression wrapper for persisted scene payloads.
//!
//! Scene bytes are wrapped in a small self-describing header before the
//! compressed block, so future format or codec changes stay detectable:
//!
//! ```text
//! [0..4]  magic "SFSC"
//! [4]     format version (u8)
//! [5]     compression method (u8)
//! [6..]   LZ4 block with prepended decompressed size
//! ```
//!
//! LZ4 is the only wired method; the enum keeps the selection explicit
//! so an alternative block codec can be added without a format break.

use crate::error::SceneError;

pub const MAGIC: &[u8; 4] = b"SFSC";
pub const VERSION: u8 = 1;

/// Cap on the declared decompressed size, guarding against hostile
/// size prefixes in corrupt or crafted files.
const MAX_PAYLOAD: u64 = 256 * 1024 * 1024;

const HEADER_LEN: usize = 6;

/// Block-compression method used for the scene payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Lz4,
}

impl Method {
    fn to_byte(self) -> u8 {
        match self {
            Method::Lz4 => 0,
        }
    }

    fn from_byte(b: u8) -> Result<Self, SceneError> {
        match b {
            0 => Ok(Method::Lz4),
            other => Err(SceneError::UnknownCompression(other)),
        }
    }
}

/// Compress raw scene bytes into a headered block.
pub fn zip(data: &[u8], method: Method) -> Vec<u8> {
    let block = match method {
        Method::Lz4 => lz4_flex::compress_prepend_size(data),
    };
    let mut out = Vec::with_capacity(HEADER_LEN + block.len());
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.push(method.to_byte());
    out.extend_from_slice(&block);
    out
}

/// Validate the header and decompress the payload.
pub fn unzip(data: &[u8]) -> Result<Vec<u8>, SceneError> {
    if data.len() < HEADER_LEN || &data[0..4] != MAGIC {
        return Err(SceneError::BadMagic);
    }
    if data[4] != VERSION {
        return Err(SceneError::UnsupportedVersion(data[4]));
    }
    let method = Method::from_byte(data[5])?;
    let block = &data[HEADER_LEN..];

    match method {
        Method::Lz4 => {
            if block.len() >= 4 {
                let declared =
                    u32::from_le_bytes([block[0], block[1], block[2], block[3]]) as u64;
                if declared > MAX_PAYLOAD {
                    return Err(SceneError::PayloadTooLarge(declared));
                }
            }
            lz4_flex::decompress_size_prepended(block)
                .map_err(|e| SceneError::Decompress(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_empty() {
        let packed = zip(&[], Method::Lz4);
        assert_eq!(unzip(&packed).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn round_trip_single_byte() {
        let packed = zip(&[42], Method::Lz4);
        assert_eq!(unzip(&packed).unwrap(), vec![42]);
    }

    #[test]
    fn round_trip_large_buffer() {
        // >1MB with enough repetition to actually compress
        let data: Vec<u8> = (0..2_000_000u32).map(|i| (i % 251) as u8).collect();
        let packed = zip(&data, Method::Lz4);
        assert!(packed.len() < data.len());
        assert_eq!(unzip(&packed).unwrap(), data);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut packed = zip(b"payload", Method::Lz4);
        packed[0] = b'X';
        assert!(matches!(unzip(&packed), Err(SceneError::BadMagic)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut packed = zip(b"payload", Method::Lz4);
        packed[4] = 99;
        assert!(matches!(
            unzip(&packed),
            Err(SceneError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn rejects_unknown_method() {
        let mut packed = zip(b"payload", Method::Lz4);
        packed[5] = 7;
        assert!(matches!(
            unzip(&packed),
            Err(SceneError::UnknownCompression(7))
        ));
    }

    #[test]
    fn rejects_oversized_declared_payload() {
        let mut packed = zip(b"payload", Method::Lz4);
        packed[6..10].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            unzip(&packed),
            Err(SceneError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn truncated_input_is_bad_magic() {
        assert!(matches!(unzip(b"SF"), Err(SceneError::BadMagic)));
    }
}
