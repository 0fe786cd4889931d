//! Container extraction, inspection and validation

use std::io::Cursor;

use tracing::{debug, warn};

use crate::cli::ValidationResult;
use crate::png::parser::find_chunk;
use crate::png::{CONTAINER_CHUNK_TAG, CONTAINER_OFFSET, ChunkHeader, PNG_PREFIX_LEN, check_header, chunk_crc};
use crate::zip::offsets::update_eocd_cd_offset;
use crate::zip::{OffsetShift, check_central_directory, find_eocd, shift_offsets};
use crate::{ContainerError, ContainerResult};

/// Summary of an embedded container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReport {
    pub chunk: ChunkHeader,
    pub stored_crc: Option<u32>,
    pub computed_crc: u32,
    pub num_entries: u16,
    pub cd_size: u32,
}

impl ContainerReport {
    pub fn crc_matches(&self) -> bool {
        self.stored_crc == Some(self.computed_crc)
    }
}

/// Find the `ziPc` chunk, scanning forward from the chunk after `IHDR`
pub fn locate_container_chunk(container: &[u8]) -> ContainerResult<ChunkHeader> {
    check_header(container)?;

    find_chunk(container, PNG_PREFIX_LEN, &CONTAINER_CHUNK_TAG).ok_or(ContainerError::ContainerChunkNotFound)
}

/// Recover the archive embedded by [`embed`](crate::embed()).
///
/// The payload is copied out of the container and its offsets are moved back
/// by [`CONTAINER_OFFSET`]. For any container produced by `embed`, the result
/// equals the archive that was embedded. The container is not modified.
pub fn extract(container: &[u8]) -> ContainerResult<Vec<u8>> {
    let chunk = locate_container_chunk(container)?;
    let mut zip = chunk.data(container)?.to_vec();

    let restored = restore_archive(&mut zip)?;
    debug!(offset = chunk.offset, zip_len = zip.len(), entries = restored, "extracted archive");

    Ok(zip)
}

/// Move all stored offsets of a shifted archive back to their original values
fn restore_archive(zip: &mut [u8]) -> ContainerResult<usize> {
    let eocd = find_eocd(zip)?;
    let shift = OffsetShift::Backward(CONTAINER_OFFSET);
    let original_cd_offset = shift.apply(eocd.cd_offset);

    check_central_directory(zip, &eocd, original_cd_offset)?;

    let restored = shift_offsets(zip, original_cd_offset as usize, eocd.cd_size, shift)?;
    update_eocd_cd_offset(zip, eocd.cd_offset_field(), original_cd_offset)?;
    Ok(restored)
}

/// Describe the embedded container without extracting it
pub fn inspect(container: &[u8]) -> ContainerResult<ContainerReport> {
    let chunk = locate_container_chunk(container)?;
    let payload = chunk.data(container)?;
    let eocd = find_eocd(payload)?;

    let report = ContainerReport {
        stored_crc: chunk.stored_crc(container),
        computed_crc: chunk_crc(&CONTAINER_CHUNK_TAG, payload),
        num_entries: eocd.num_entries_total,
        cd_size: eocd.cd_size,
        chunk,
    };

    if !report.crc_matches() {
        warn!(
            stored = ?report.stored_crc,
            computed = report.computed_crc,
            "container chunk CRC mismatch"
        );
    }

    Ok(report)
}

/// Validate that a container is both a decodable PNG and a carrier of a
/// readable ZIP archive
pub fn validate_container(container: &[u8]) -> ValidationResult {
    let png_result = validate_as_png(container);
    let zip_result = validate_embedded_zip(container);

    match (png_result, zip_result) {
        (Ok(_), Ok(_)) => ValidationResult::Valid,
        (Err(png_err), Ok(_)) => ValidationResult::InvalidPng(png_err),
        (Ok(_), Err(zip_err)) => ValidationResult::InvalidZip(zip_err),
        (Err(png_err), Err(zip_err)) => ValidationResult::InvalidBoth(png_err, zip_err),
    }
}

/// Decode the whole image; the `ziPc` chunk must be skipped by the decoder
fn validate_as_png(data: &[u8]) -> Result<(), String> {
    let decoder = ::png::Decoder::new(Cursor::new(data));
    let mut reader = decoder.read_info().map_err(|e| e.to_string())?;
    let mut frame = vec![0; reader.output_buffer_size()];
    reader.next_frame(&mut frame).map_err(|e| e.to_string())?;
    Ok(())
}

/// Extract the archive and read every entry, which checks each entry's CRC
fn validate_embedded_zip(data: &[u8]) -> Result<(), String> {
    let zip = extract(data).map_err(|e| e.to_string())?;
    let mut archive = ::zip::ZipArchive::new(Cursor::new(zip)).map_err(|e| e.to_string())?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| e.to_string())?;
        std::io::copy(&mut file, &mut std::io::sink())
            .map_err(|e| format!("{}: {}", file.name(), e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::embed;
    use crate::fixtures::{
        build_zip, create_empty_zip, create_encoded_png, create_test_png, create_test_zip,
        pattern_bytes, read_zip_entries,
    };
    use crate::png::encode_chunk;
    use crate::utils::write_u32_le;
    use proptest::prelude::*;

    #[test]
    fn test_round_trip_empty_zip() {
        let png = create_test_png();
        let zip = create_empty_zip();

        let container = embed(&zip, &png).unwrap();
        assert_eq!(container.len(), png.len() + 34);
        assert_eq!(&container[..33], &png[..33]);
        assert_eq!(&container[33..41], &[0x00, 0x00, 0x00, 0x16, b'z', b'i', b'P', b'c']);

        assert_eq!(extract(&container).unwrap(), zip);
    }

    #[test]
    fn test_round_trip_single_entry() {
        let png = create_test_png();
        let zip = create_test_zip();

        let container = embed(&zip, &png).unwrap();
        assert_eq!(extract(&container).unwrap(), zip);
    }

    #[test]
    fn test_round_trip_three_entries() {
        let png = create_test_png();
        let zip = build_zip(&[
            ("readme.txt", b"first file at the root".as_slice()),
            ("notes.md", b"# second root file\n".as_slice()),
            ("assets/data.bin", [0xFE, 0xED, 0xFA, 0xCE].as_slice()),
        ]);

        let container = embed(&zip, &png).unwrap();
        let extracted = extract(&container).unwrap();
        assert_eq!(extracted, zip);

        let entries = read_zip_entries(&extracted);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], ("readme.txt".to_string(), b"first file at the root".to_vec()));
        assert_eq!(entries[1], ("notes.md".to_string(), b"# second root file\n".to_vec()));
        assert_eq!(entries[2], ("assets/data.bin".to_string(), vec![0xFE, 0xED, 0xFA, 0xCE]));
    }

    #[test]
    fn test_round_trip_large_entry() {
        let png = create_test_png();
        let content = pattern_bytes(100 * 1024);
        let zip = build_zip(&[("large.bin", content.as_slice())]);

        let container = embed(&zip, &png).unwrap();
        let extracted = extract(&container).unwrap();

        assert_eq!(extracted, zip);
        assert_eq!(read_zip_entries(&extracted)[0].1, content);
    }

    #[test]
    fn test_zip_crate_reads_shifted_payload_in_place() {
        // Inside the container the shifted offsets are valid container offsets
        let png = create_test_png();
        let zip = build_zip(&[("a.txt", b"alpha".as_slice()), ("b/c.txt", b"gamma".as_slice())]);
        let container = embed(&zip, &png).unwrap();

        let prefix_and_payload = &container[..41 + zip.len()];
        let entries = read_zip_entries(prefix_and_payload);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].1, b"gamma");
    }

    #[test]
    fn test_extract_does_not_mutate_container() {
        let container = embed(&create_test_zip(), &create_test_png()).unwrap();
        let before = container.clone();

        extract(&container).unwrap();
        assert_eq!(container, before);
    }

    #[test]
    fn test_extract_chunk_not_found() {
        let png = create_test_png();
        assert!(matches!(extract(&png), Err(ContainerError::ContainerChunkNotFound)));
        assert!(matches!(extract(&png[..33]), Err(ContainerError::ContainerChunkNotFound)));
    }

    #[test]
    fn test_extract_invalid_header() {
        assert!(matches!(extract(b"not a png at all"), Err(ContainerError::InvalidPngHeader)));
        assert!(matches!(extract(&[]), Err(ContainerError::InvalidPngHeader)));
    }

    #[test]
    fn test_extract_finds_chunk_after_other_chunks() {
        // A ziPc chunk further down the stream is still found
        let png = create_test_png();
        let container = embed(&create_test_zip(), &png).unwrap();
        let chunk = container[33..41 + create_test_zip().len() + 4].to_vec();

        let mut moved = png[..33].to_vec();
        moved.extend_from_slice(&png[33..png.len() - 12]); // IDAT
        moved.extend_from_slice(&chunk);
        moved.extend_from_slice(&png[png.len() - 12..]); // IEND

        assert_eq!(locate_container_chunk(&moved).unwrap().offset, png.len() - 12);
    }

    #[test]
    fn test_extract_payload_without_eocd() {
        let mut container = create_test_png();
        let iend = container.split_off(container.len() - 12);
        container.extend_from_slice(&encode_chunk(b"ziPc", b"no archive in here").unwrap());
        container.extend_from_slice(&iend);

        assert!(matches!(extract(&container), Err(ContainerError::EocdNotFound)));
    }

    #[test]
    fn test_extract_truncated_chunk() {
        let container = embed(&create_test_zip(), &create_test_png()).unwrap();
        let cut = &container[..60];

        assert!(matches!(extract(cut), Err(ContainerError::TruncatedChunk { .. })));
    }

    #[test]
    fn test_extract_corrupted_directory_offset() {
        let zip = create_test_zip();
        let mut container = embed(&zip, &create_test_png()).unwrap();

        // EOCD CEN offset now points past the EOCD once unshifted
        write_u32_le(&mut container, 41 + 84 + 16, 200);
        assert!(matches!(extract(&container), Err(ContainerError::InvalidZipStructure(_))));
    }

    #[test]
    fn test_inspect_report() {
        let zip = create_test_zip();
        let container = embed(&zip, &create_test_png()).unwrap();

        let report = inspect(&container).unwrap();
        assert_eq!(report.chunk.offset, 33);
        assert_eq!(report.chunk.length as usize, zip.len());
        assert_eq!(report.num_entries, 1);
        assert_eq!(report.cd_size, 50);
        assert!(report.crc_matches());
    }

    #[test]
    fn test_inspect_detects_crc_mismatch() {
        let zip = create_test_zip();
        let mut container = embed(&zip, &create_test_png()).unwrap();
        container[41 + 30] ^= 0x01; // inside the stored file name

        let report = inspect(&container).unwrap();
        assert!(!report.crc_matches());
    }

    #[test]
    fn test_container_decodes_as_png() {
        let png = create_encoded_png(4, 3);
        let zip = build_zip(&[("a.txt", b"alpha".as_slice())]);
        let container = embed(&zip, &png).unwrap();

        let decoder = ::png::Decoder::new(Cursor::new(&container));
        let reader = decoder.read_info().unwrap();
        assert_eq!(reader.info().width, 4);
        assert_eq!(reader.info().height, 3);
    }

    #[test]
    fn test_validate_container() {
        let png = create_encoded_png(2, 2);
        let zip = build_zip(&[("a.txt", b"alpha".as_slice()), ("dir/b.txt", b"beta".as_slice())]);
        let container = embed(&zip, &png).unwrap();

        assert_eq!(validate_container(&container), ValidationResult::Valid);
        assert!(matches!(validate_container(&png), ValidationResult::InvalidZip(_)));
        assert!(matches!(
            validate_container(&[0x00, 0x01, 0x02, 0x03]),
            ValidationResult::InvalidBoth(_, _)
        ));
    }

    /// Archive whose unstructured bytes are all `0xFF`: versions, flags, times,
    /// CRCs, sizes, attributes, file data, extra fields and comments.
    fn filler_zip(files: &[(String, usize, usize, usize)], archive_comment: usize) -> Vec<u8> {
        let mut zip = Vec::new();
        let mut local_offsets = Vec::new();

        for (name, data_len, _, _) in files {
            local_offsets.push(zip.len() as u32);
            zip.extend_from_slice(b"PK\x03\x04");
            zip.extend_from_slice(&[0xFF; 22]);
            zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
            zip.extend_from_slice(&0u16.to_le_bytes());
            zip.extend_from_slice(name.as_bytes());
            zip.extend(std::iter::repeat_n(0xFF, *data_len));
        }

        let cd_offset = zip.len() as u32;
        for ((name, _, extra_len, comment_len), local_offset) in files.iter().zip(&local_offsets) {
            zip.extend_from_slice(b"PK\x01\x02");
            zip.extend_from_slice(&[0xFF; 24]);
            zip.extend_from_slice(&(name.len() as u16).to_le_bytes());
            zip.extend_from_slice(&(*extra_len as u16).to_le_bytes());
            zip.extend_from_slice(&(*comment_len as u16).to_le_bytes());
            zip.extend_from_slice(&[0xFF; 8]);
            zip.extend_from_slice(&local_offset.to_le_bytes());
            zip.extend_from_slice(name.as_bytes());
            zip.extend(std::iter::repeat_n(0xFF, extra_len + comment_len));
        }
        let cd_size = zip.len() as u32 - cd_offset;

        zip.extend_from_slice(b"PK\x05\x06");
        zip.extend_from_slice(&[0xFF; 8]);
        zip.extend_from_slice(&cd_size.to_le_bytes());
        zip.extend_from_slice(&cd_offset.to_le_bytes());
        zip.extend_from_slice(&(archive_comment as u16).to_le_bytes());
        zip.extend(std::iter::repeat_n(0xFF, archive_comment));
        zip
    }

    fn filler_files() -> impl Strategy<Value = Vec<(String, usize, usize, usize)>> {
        prop::collection::vec(("[a-z]{1,12}(/[a-z]{1,8})?", 0usize..300, 0usize..40, 0usize..40), 0..8)
    }

    proptest! {
        #[test]
        fn prop_round_trip_filler_archive(files in filler_files(), comment in 0usize..64) {
            let png = create_test_png();
            let zip = filler_zip(&files, comment);

            let container = embed(&zip, &png).unwrap();
            prop_assert_eq!(container.len(), png.len() + zip.len() + 12);
            prop_assert_eq!(extract(&container).unwrap(), zip);
        }

        #[test]
        fn prop_shifted_offsets_point_into_container(files in filler_files()) {
            let png = create_test_png();
            let zip = filler_zip(&files, 0);
            let container = embed(&zip, &png).unwrap();

            let payload = &container[41..41 + zip.len()];
            let eocd = find_eocd(payload).unwrap();
            let cd = eocd.cd_offset as usize;
            if !files.is_empty() {
                prop_assert_eq!(&container[cd..cd + 4], b"PK\x01\x02");
            }
            for entry in crate::zip::CentralDirectoryCursor::new(payload, cd - 41, eocd.cd_size) {
                let local = entry.unwrap().local_header_offset as usize;
                prop_assert_eq!(&container[local..local + 4], b"PK\x03\x04");
            }
        }

        #[test]
        fn prop_round_trip_png_tail(tail in prop::collection::vec(0u8..0x50, 0..512)) {
            // Arbitrary trailing chunk bytes are copied verbatim
            let mut png = create_test_png();
            png.extend_from_slice(&tail);
            let zip = create_test_zip();

            let container = embed(&zip, &png).unwrap();
            prop_assert_eq!(&container[container.len() - png.len() + 33..], &png[33..]);
            prop_assert_eq!(extract(&container).unwrap(), zip);
        }
    }
}
