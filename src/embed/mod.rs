//! Embedding a ZIP archive into a PNG as a `ziPc` chunk

use tracing::debug;

use crate::png::{
    CHUNK_CRC_LEN, CHUNK_HEADER_LEN, CONTAINER_CHUNK_TAG, CONTAINER_OFFSET, PNG_PREFIX_LEN,
    chunk_crc, check_header,
};
use crate::utils::contains_pattern;
use crate::zip::offsets::update_eocd_cd_offset;
use crate::zip::{EOCD_SIGNATURE, EocdRecord, OffsetShift, check_central_directory, find_eocd, shift_offsets};
use crate::{ContainerError, ContainerResult};

/// Bytes `embed` adds on top of the PNG and ZIP lengths
pub const EMBED_OVERHEAD: usize = CHUNK_HEADER_LEN + CHUNK_CRC_LEN;

/// Embed `zip` into `png`, returning a new PNG that carries the archive.
///
/// The archive is stored as a `ziPc` chunk directly after `IHDR`, with every
/// local header offset and the central directory offset moved forward by
/// [`CONTAINER_OFFSET`]. The chunks after `IHDR` are copied unchanged, so the
/// output is `png.len() + zip.len() + 12` bytes long.
///
/// All checks run before any output is produced. Neither input is modified.
pub fn embed(zip: &[u8], png: &[u8]) -> ContainerResult<Vec<u8>> {
    check_png(png)?;
    let eocd = check_zip(zip)?;

    let length = u32::try_from(zip.len()).map_err(|_| ContainerError::PayloadTooLarge(zip.len()))?;

    let mut output = Vec::with_capacity(png.len() + zip.len() + EMBED_OVERHEAD);
    output.extend_from_slice(&png[..PNG_PREFIX_LEN]);
    output.extend_from_slice(&length.to_be_bytes());
    output.extend_from_slice(&CONTAINER_CHUNK_TAG);

    let payload_start = output.len();
    output.extend_from_slice(zip);

    let payload = &mut output[payload_start..];
    let shifted = shift_archive(payload, &eocd)?;

    // A shifted field can spell the EOCD signature behind the real record
    let relocated = find_eocd(payload)?;
    if relocated.position != eocd.position {
        return Err(ContainerError::zip_structure(format!(
            "shifted offsets form an EOCD signature at {}, past the record at {}",
            relocated.position, eocd.position
        )));
    }

    let crc = chunk_crc(&CONTAINER_CHUNK_TAG, payload);
    output.extend_from_slice(&crc.to_be_bytes());
    output.extend_from_slice(&png[PNG_PREFIX_LEN..]);

    debug!(
        zip_len = zip.len(),
        png_len = png.len(),
        entries = shifted,
        crc,
        "embedded archive"
    );

    Ok(output)
}

/// Whether `png` can host an archive
fn check_png(png: &[u8]) -> ContainerResult<()> {
    check_header(png)?;

    // The full IHDR chunk is copied as-is
    if png.len() < PNG_PREFIX_LEN {
        return Err(ContainerError::InvalidPngHeader);
    }

    if contains_pattern(png, &EOCD_SIGNATURE) {
        return Err(ContainerError::PngContainsEocdSignature);
    }

    Ok(())
}

/// Locate the EOCD of `zip` and check its central directory
fn check_zip(zip: &[u8]) -> ContainerResult<EocdRecord> {
    let eocd = find_eocd(zip)?;
    check_central_directory(zip, &eocd, eocd.cd_offset)?;
    Ok(eocd)
}

/// Move all stored offsets of an unshifted archive forward
fn shift_archive(archive: &mut [u8], eocd: &EocdRecord) -> ContainerResult<usize> {
    let shift = OffsetShift::Forward(CONTAINER_OFFSET);
    let shifted = shift_offsets(archive, eocd.cd_offset as usize, eocd.cd_size, shift)?;
    update_eocd_cd_offset(archive, eocd.cd_offset_field(), shift.apply(eocd.cd_offset))?;
    Ok(shifted)
}
