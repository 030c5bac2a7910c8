//! Flat binary codec for the scene wire format.
//!
//! All numeric values are little-endian: f32 and i32 are 4 bytes, bools
//! are a single byte. Strings are UTF-16LE with a 4-byte byte-length
//! prefix (byte count, not character count). Composite values (Vec3,
//! Quat) are their components in x,y,z(,w) order.
//!
//! Every decode is bounds-checked; reading past the end of the buffer,
//! a negative or odd string length, or an invalid UTF-16 payload is a
//! [`SceneError::Corrupt`], never a panic.

use glam::{Quat, Vec3};

use crate::error::SceneError;

/// Appends wire-format values to a growing byte buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    /// Consume the encoder, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    /// UTF-16LE payload preceded by its byte length as an i32.
    pub fn put_str(&mut self, s: &str) {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.put_i32((units.len() * 2) as i32);
        for unit in units {
            self.buf.extend_from_slice(&unit.to_le_bytes());
        }
    }

    pub fn put_vec3(&mut self, v: Vec3) {
        self.put_f32(v.x);
        self.put_f32(v.y);
        self.put_f32(v.z);
    }

    pub fn put_quat(&mut self, q: Quat) {
        self.put_f32(q.x);
        self.put_f32(q.y);
        self.put_f32(q.z);
        self.put_f32(q.w);
    }
}

/// Consumes wire-format values from a byte slice, tracking its offset.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset, for error reporting by callers.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], SceneError> {
        if self.remaining() < n {
            return Err(SceneError::corrupt(
                self.pos,
                format!("need {} bytes, {} remain", n, self.remaining()),
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn take_f32(&mut self) -> Result<f32, SceneError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn take_i32(&mut self) -> Result<i32, SceneError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn take_bool(&mut self) -> Result<bool, SceneError> {
        let b = self.take(1)?;
        Ok(b[0] != 0)
    }

    pub fn take_str(&mut self) -> Result<String, SceneError> {
        let at = self.pos;
        let byte_len = self.take_i32()?;
        if byte_len < 0 {
            return Err(SceneError::corrupt(at, "negative string length"));
        }
        let byte_len = byte_len as usize;
        if byte_len % 2 != 0 {
            return Err(SceneError::corrupt(at, "odd UTF-16 byte length"));
        }
        let raw = self.take(byte_len)?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|_| SceneError::corrupt(at, "invalid UTF-16 string"))
    }

    pub fn take_vec3(&mut self) -> Result<Vec3, SceneError> {
        Ok(Vec3::new(self.take_f32()?, self.take_f32()?, self.take_f32()?))
    }

    pub fn take_quat(&mut self) -> Result<Quat, SceneError> {
        let x = self.take_f32()?;
        let y = self.take_f32()?;
        let z = self.take_f32()?;
        let w = self.take_f32()?;
        Ok(Quat::from_xyzw(x, y, z, w))
    }
}
