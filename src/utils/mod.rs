//! Byte-level helpers shared by the PNG and ZIP sides of the codec

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use crc32fast::Hasher;

/// IEEE 802.3 CRC-32, continuing from `previous`.
///
/// `previous` is a finished CRC value, not raw register state: passing the CRC
/// of `a` while hashing `b` yields the CRC of `a ‖ b`. A fresh computation uses
/// `0`. This is how PNG chunk CRCs cover the type tag and data as one stream.
pub fn crc32(bytes: &[u8], previous: u32) -> u32 {
    let mut hasher = Hasher::new_with_initial(previous);
    hasher.update(bytes);
    hasher.finalize()
}

/// Read a big-endian u32 from byte slice
pub fn read_u32_be(bytes: &[u8], offset: usize) -> u32 {
    BigEndian::read_u32(&bytes[offset..offset + 4])
}

/// Read a little-endian u16 from byte slice
pub fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&bytes[offset..offset + 2])
}

/// Read a little-endian u32 from byte slice
pub fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&bytes[offset..offset + 4])
}

/// Write a little-endian u32 to byte slice
pub fn write_u32_le(bytes: &mut [u8], offset: usize, value: u32) {
    LittleEndian::write_u32(&mut bytes[offset..offset + 4], value);
}

/// Whether `pattern` occurs anywhere in `data`
pub fn contains_pattern(data: &[u8], pattern: &[u8]) -> bool {
    data.windows(pattern.len()).any(|w| w == pattern)
}
