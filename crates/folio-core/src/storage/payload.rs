use std::fmt;

use crate::storage::error::{Result, StorageSystemError};
use crate::storage::handle::CollisionPolicy;

/// Bytes per pixel of a [`PixelBuffer`] (BGRA, 8 bits per channel).
pub const BYTES_PER_PIXEL: usize = 4;

/// The kinds of content the storage service writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// UTF-8 text, written as one buffer.
    Text,
    /// An async byte stream, copied in chunks.
    ByteStream,
    /// Raw bitmap pixels, written as one opaque blob.
    PixelBuffer,
}

impl PayloadKind {
    /// How the target file is created before the payload is written.
    ///
    /// Pixel buffers always land in a fresh file; text and streams reuse an
    /// existing file and overwrite its contents.
    pub fn collision_policy(self) -> CollisionPolicy {
        match self {
            PayloadKind::Text | PayloadKind::ByteStream => CollisionPolicy::OpenIfExists,
            PayloadKind::PixelBuffer => CollisionPolicy::ReplaceExisting,
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Text => "text",
            PayloadKind::ByteStream => "byte stream",
            PayloadKind::PixelBuffer => "pixel buffer",
        };
        f.write_str(name)
    }
}

/// Uncompressed bitmap pixels, row-major, [`BYTES_PER_PIXEL`] bytes each.
///
/// Stored verbatim: no header, no encoding. The dimensions are not part of
/// the stored blob, so readers must know them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| StorageSystemError::InvalidPixelBuffer(format!("{}x{} is too large", width, height)))?;

        if pixels.len() != expected {
            return Err(StorageSystemError::InvalidPixelBuffer(format!(
                "{}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self { width, height, pixels })
    }

    /// A buffer of the given size with every byte zeroed.
    pub fn blank(width: u32, height: u32) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| StorageSystemError::InvalidPixelBuffer(format!("{}x{} is too large", width, height)))?;
        Self::new(width, height, vec![0; len])
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }
}
