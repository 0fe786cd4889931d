//! Central directory walk and local header offset shifting

use crate::utils::{read_u16_le, read_u32_le, write_u32_le};
use crate::{ContainerError, ContainerResult};

/// Fixed part of a central directory entry
pub const CENTRAL_HEADER_LEN: usize = 46;

// Central directory entry field offsets (little-endian)
pub const CEN_NAME_LEN: usize = 28;
pub const CEN_EXTRA_LEN: usize = 30;
pub const CEN_COMMENT_LEN: usize = 32;
pub const CEN_LOCAL_HEADER_OFFSET: usize = 42;

/// One central directory entry as seen by the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralEntry {
    pub position: usize,
    pub local_header_offset: u32,
    pub name_len: u16,
    pub extra_len: u16,
    pub comment_len: u16,
}

impl CentralEntry {
    /// Total size of this entry including its variable tail
    pub fn len(&self) -> usize {
        CENTRAL_HEADER_LEN + self.name_len as usize + self.extra_len as usize + self.comment_len as usize
    }

    /// Buffer offset of the stored local header offset
    pub fn local_header_offset_field(&self) -> usize {
        self.position + CEN_LOCAL_HEADER_OFFSET
    }
}

/// Walks central directory entries for `size` bytes starting at `start`.
///
/// Each entry is advanced over using its own name/extra/comment lengths. An
/// entry whose fixed part runs past the buffer yields an error and ends the
/// walk. Entry signatures are not checked here.
#[derive(Debug, Clone)]
pub struct CentralDirectoryCursor<'a> {
    data: &'a [u8],
    start: usize,
    size: usize,
    consumed: usize,
    failed: bool,
}

impl<'a> CentralDirectoryCursor<'a> {
    pub fn new(data: &'a [u8], start: usize, size: u32) -> Self {
        Self {
            data,
            start,
            size: size as usize,
            consumed: 0,
            failed: false,
        }
    }
}

impl Iterator for CentralDirectoryCursor<'_> {
    type Item = ContainerResult<CentralEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.consumed >= self.size {
            return None;
        }

        let position = self.start.saturating_add(self.consumed);
        if position.saturating_add(CENTRAL_HEADER_LEN) > self.data.len() {
            self.failed = true;
            return Some(Err(ContainerError::zip_structure(format!(
                "central directory entry at {} runs past the end of the archive",
                position
            ))));
        }

        let entry = CentralEntry {
            position,
            local_header_offset: read_u32_le(self.data, position + CEN_LOCAL_HEADER_OFFSET),
            name_len: read_u16_le(self.data, position + CEN_NAME_LEN),
            extra_len: read_u16_le(self.data, position + CEN_EXTRA_LEN),
            comment_len: read_u16_le(self.data, position + CEN_COMMENT_LEN),
        };

        self.consumed += entry.len();
        Some(Ok(entry))
    }
}

/// Direction and amount of an offset adjustment.
///
/// Arithmetic wraps at 32 bits like the stored fields, so a shift followed by
/// its inverse restores every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetShift {
    Forward(u32),
    Backward(u32),
}

impl OffsetShift {
    pub fn apply(self, value: u32) -> u32 {
        match self {
            OffsetShift::Forward(delta) => value.wrapping_add(delta),
            OffsetShift::Backward(delta) => value.wrapping_sub(delta),
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            OffsetShift::Forward(delta) => OffsetShift::Backward(delta),
            OffsetShift::Backward(delta) => OffsetShift::Forward(delta),
        }
    }
}

/// Shift the local header offset of every entry in the central directory.
///
/// All entries are walked before the first write, so a malformed directory
/// leaves `data` untouched. Returns the number of entries shifted.
pub fn shift_offsets(data: &mut [u8], cd_start: usize, cd_size: u32, shift: OffsetShift) -> ContainerResult<usize> {
    let entries = CentralDirectoryCursor::new(data, cd_start, cd_size)
        .collect::<ContainerResult<Vec<_>>>()?;

    for entry in &entries {
        write_u32_le(data, entry.local_header_offset_field(), shift.apply(entry.local_header_offset));
    }

    Ok(entries.len())
}

/// Update the central directory offset in the EOCD record
pub fn update_eocd_cd_offset(data: &mut [u8], cd_offset_field: usize, new_cd_offset: u32) -> ContainerResult<()> {
    if cd_offset_field + 4 > data.len() {
        return Err(ContainerError::zip_structure("EOCD offset field past the end"));
    }

    write_u32_le(data, cd_offset_field, new_cd_offset);
    Ok(())
}
