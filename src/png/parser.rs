//! Forward walk over PNG chunks using manual byte slicing

use crate::utils::read_u32_be;
use crate::{ContainerError, ContainerResult};
use super::{CHUNK_CRC_LEN, CHUNK_HEADER_LEN};

/// Position and header fields of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub offset: usize, // Start of the length field
    pub length: u32,
    pub chunk_type: [u8; 4],
}

impl ChunkHeader {
    /// Offset of the first data byte
    pub fn data_offset(&self) -> usize {
        self.offset + CHUNK_HEADER_LEN
    }

    /// Offset of the trailing CRC
    pub fn crc_offset(&self) -> usize {
        self.data_offset().saturating_add(self.length as usize)
    }

    /// Offset just past this chunk
    pub fn end_offset(&self) -> usize {
        self.crc_offset().saturating_add(CHUNK_CRC_LEN)
    }

    /// Data slice of this chunk, checked against the buffer end
    pub fn data<'a>(&self, buffer: &'a [u8]) -> ContainerResult<&'a [u8]> {
        let start = self.data_offset();
        let end = self.crc_offset();
        if end > buffer.len() {
            return Err(ContainerError::TruncatedChunk {
                tag: String::from_utf8_lossy(&self.chunk_type).to_string(),
                declared: self.length as usize,
                available: buffer.len().saturating_sub(start),
            });
        }
        Ok(&buffer[start..end])
    }

    /// Stored CRC of this chunk, if the buffer holds it
    pub fn stored_crc(&self, buffer: &[u8]) -> Option<u32> {
        let at = self.crc_offset();
        (at.saturating_add(CHUNK_CRC_LEN) <= buffer.len()).then(|| read_u32_be(buffer, at))
    }
}

/// Iterator over chunk headers starting at a chunk boundary.
///
/// Each step reads the 4-byte length and type, then skips the data and CRC.
/// The walk ends once fewer than 8 bytes remain. Data and CRC are not
/// required to be present; callers bounds-check via [`ChunkHeader::data`].
#[derive(Debug, Clone)]
pub struct ChunkWalker<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ChunkWalker<'a> {
    pub fn new(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }
}

impl Iterator for ChunkWalker<'_> {
    type Item = ChunkHeader;

    fn next(&mut self) -> Option<ChunkHeader> {
        let offset = self.offset;
        if offset.checked_add(CHUNK_HEADER_LEN)? > self.data.len() {
            return None;
        }

        let length = read_u32_be(self.data, offset);
        let chunk_type = [
            self.data[offset + 4],
            self.data[offset + 5],
            self.data[offset + 6],
            self.data[offset + 7],
        ];

        let header = ChunkHeader { offset, length, chunk_type };
        self.offset = header.end_offset();
        Some(header)
    }
}

/// Find the first chunk with the given tag at or after `offset`
pub fn find_chunk(data: &[u8], offset: usize, tag: &[u8; 4]) -> Option<ChunkHeader> {
    ChunkWalker::new(data, offset).find(|chunk| &chunk.chunk_type == tag)
}
