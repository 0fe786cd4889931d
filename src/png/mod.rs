//! PNG container geometry and chunk construction

pub mod parser;

use crate::utils::crc32;
use crate::{ContainerError, ContainerResult};
pub use parser::{ChunkHeader, ChunkWalker};

/// PNG file signature
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Signature followed by the `IHDR` length (always 13) and type tag
pub const PNG_HEADER: [u8; 16] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // signature
    0x00, 0x00, 0x00, 0x0D, // IHDR length
    b'I', b'H', b'D', b'R',
];

/// Length + type fields of a chunk
pub const CHUNK_HEADER_LEN: usize = 8;

/// Trailing CRC of a chunk
pub const CHUNK_CRC_LEN: usize = 4;

/// `IHDR` data is fixed at 13 bytes
pub const IHDR_DATA_LEN: usize = 13;

/// Signature plus the complete `IHDR` chunk
pub const PNG_PREFIX_LEN: usize = PNG_HEADER.len() + IHDR_DATA_LEN + CHUNK_CRC_LEN;

/// Tag of the chunk carrying the archive.
///
/// Lowercase first letter: ancillary. Lowercase second: private.
/// Lowercase last: safe to copy.
pub const CONTAINER_CHUNK_TAG: [u8; 4] = *b"ziPc";

/// Bytes placed in front of the archive: PNG prefix plus the container
/// chunk's length and type. Every ZIP offset moves by this much.
pub const CONTAINER_OFFSET: u32 = 41;

const _: () = assert!(CONTAINER_OFFSET as usize == PNG_PREFIX_LEN + CHUNK_HEADER_LEN);

/// Validate PNG signature
pub fn is_png_signature(data: &[u8]) -> bool {
    data.len() >= PNG_SIGNATURE.len() && data[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Check the signature and `IHDR` header that every embeddable PNG starts with
pub fn check_header(data: &[u8]) -> ContainerResult<()> {
    if data.len() < PNG_HEADER.len() || data[..PNG_HEADER.len()] != PNG_HEADER {
        return Err(ContainerError::InvalidPngHeader);
    }
    Ok(())
}

/// CRC of a chunk, covering the type tag and data as one stream
pub fn chunk_crc(tag: &[u8; 4], data: &[u8]) -> u32 {
    crc32(data, crc32(tag, 0))
}

/// Serialize a complete chunk (length, type, data, CRC)
pub fn encode_chunk(tag: &[u8; 4], data: &[u8]) -> ContainerResult<Vec<u8>> {
    let length = u32::try_from(data.len())
        .map_err(|_| ContainerError::PayloadTooLarge(data.len()))?;

    let mut chunk = Vec::with_capacity(CHUNK_HEADER_LEN + data.len() + CHUNK_CRC_LEN);
    chunk.extend_from_slice(&length.to_be_bytes());
    chunk.extend_from_slice(tag);
    chunk.extend_from_slice(data);
    chunk.extend_from_slice(&chunk_crc(tag, data).to_be_bytes());
    Ok(chunk)
}
