//! ZIP end-of-central-directory location and structural checks

pub mod offsets;

use crate::utils::{read_u16_le, read_u32_le};
use crate::{ContainerError, ContainerResult};
pub use offsets::{CentralDirectoryCursor, CentralEntry, OffsetShift, shift_offsets};

/// Central directory entry signature (PK\x01\x02)
pub const CENTRAL_HEADER_SIGNATURE: u32 = 0x02014B50;

/// End of central directory signature as it appears on disk (PK\x05\x06)
pub const EOCD_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// Fixed part of the EOCD record
pub const EOCD_LEN: usize = 22;

/// Largest archive comment the EOCD can declare
pub const MAX_COMMENT_LEN: usize = u16::MAX as usize;

// EOCD field offsets (little-endian)
pub const EOCD_ENTRIES_TOTAL: usize = 10;
pub const EOCD_CD_SIZE: usize = 12;
pub const EOCD_CD_OFFSET: usize = 16;
pub const EOCD_COMMENT_LEN: usize = 20;

/// End of Central Directory record as located in a buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EocdRecord {
    pub position: usize,     // Offset of the signature in the buffer
    pub num_entries_total: u16,
    pub cd_size: u32,
    pub cd_offset: u32,      // As stored, possibly shifted
    pub comment_length: u16,
}

impl EocdRecord {
    /// Buffer offset of the stored central directory offset
    pub fn cd_offset_field(&self) -> usize {
        self.position + EOCD_CD_OFFSET
    }
}

/// Locate the End of Central Directory record in ZIP data.
///
/// Searches backward over the last 22 + 65535 bytes, considering only
/// positions where a complete fixed record fits. The comment length field is
/// not cross-checked against the remaining bytes.
pub fn find_eocd(data: &[u8]) -> ContainerResult<EocdRecord> {
    if data.len() < EOCD_LEN {
        return Err(ContainerError::EocdNotFound);
    }

    let last = data.len() - EOCD_LEN;
    let first = data.len().saturating_sub(EOCD_LEN + MAX_COMMENT_LEN);

    let position = (first..=last)
        .rev()
        .find(|&pos| data[pos..pos + 4] == EOCD_SIGNATURE)
        .ok_or(ContainerError::EocdNotFound)?;

    Ok(EocdRecord {
        position,
        num_entries_total: read_u16_le(data, position + EOCD_ENTRIES_TOTAL),
        cd_size: read_u32_le(data, position + EOCD_CD_SIZE),
        cd_offset: read_u32_le(data, position + EOCD_CD_OFFSET),
        comment_length: read_u16_le(data, position + EOCD_COMMENT_LEN),
    })
}

/// Check that a non-empty central directory starts before the EOCD with a
/// central directory entry signature.
///
/// `cd_offset` is the unshifted position of the central directory in `data`.
/// A zero-size central directory (empty archive) always passes.
pub fn check_central_directory(data: &[u8], eocd: &EocdRecord, cd_offset: u32) -> ContainerResult<()> {
    if eocd.cd_size == 0 {
        return Ok(());
    }

    let start = cd_offset as usize;
    if start >= eocd.position {
        return Err(ContainerError::zip_structure(format!(
            "central directory at {} is not before EOCD at {}",
            start, eocd.position
        )));
    }

    // start + 4 <= eocd.position + 4 <= data.len()
    if read_u32_le(data, start) != CENTRAL_HEADER_SIGNATURE {
        return Err(ContainerError::zip_structure(format!(
            "no central directory signature at {}",
            start
        )));
    }

    Ok(())
}
