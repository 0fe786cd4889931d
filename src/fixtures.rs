//! Shared test inputs: hand-built PNGs and ZIPs plus crate-built ones

use std::io::{Cursor, Write};

use crate::png::{PNG_SIGNATURE, encode_chunk};

/// Minimal 1x1 RGB PNG: signature, IHDR, IDAT, IEND
pub fn create_test_png() -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();

    let ihdr_data = [
        0x00, 0x00, 0x00, 0x01, // width = 1
        0x00, 0x00, 0x00, 0x01, // height = 1
        0x08, // bit depth = 8
        0x02, // color type = 2 (RGB)
        0x00, // compression = 0
        0x00, // filter = 0
        0x00, // interlace = 0
    ];
    png.extend_from_slice(&encode_chunk(b"IHDR", &ihdr_data).unwrap());

    // zlib stream of one scanline: filter 0, pixel ff 00 00
    let idat_data = [0x78, 0xDA, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x03, 0x01, 0x01, 0x00];
    png.extend_from_slice(&encode_chunk(b"IDAT", &idat_data).unwrap());

    png.extend_from_slice(&encode_chunk(b"IEND", &[]).unwrap());
    png
}

/// PNG produced by the `png` crate encoder
pub fn create_encoded_png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = ::png::Encoder::new(&mut out, width, height);
        encoder.set_color(::png::ColorType::Rgb);
        encoder.set_depth(::png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let pixels: Vec<u8> = (0..width * height * 3).map(|i| (i % 7) as u8).collect();
        writer.write_image_data(&pixels).unwrap();
    }
    out
}

/// Zero-entry archive: a bare EOCD record
pub fn create_empty_zip() -> Vec<u8> {
    let mut zip = vec![0x50, 0x4B, 0x05, 0x06];
    zip.extend_from_slice(&[0u8; 18]);
    zip
}

/// Minimal ZIP file with one empty stored file named `test`
pub fn create_test_zip() -> Vec<u8> {
    // Local file header
    let mut zip = vec![0x50, 0x4B, 0x03, 0x04]; // LFHS
    zip.extend_from_slice(&[0x0A, 0x00]); // Version needed
    zip.extend_from_slice(&[0x00, 0x00]); // GPB flag
    zip.extend_from_slice(&[0x00, 0x00]); // Compression method
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Last mod time/date
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // CRC32
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Compressed size
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Uncompressed size
    zip.extend_from_slice(&[0x04, 0x00]); // Filename length
    zip.extend_from_slice(&[0x00, 0x00]); // Extra field length
    zip.extend_from_slice(b"test"); // Filename

    // Central directory header
    zip.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]); // CDHS
    zip.extend_from_slice(&[0x0A, 0x00]); // Version made by
    zip.extend_from_slice(&[0x0A, 0x00]); // Version needed
    zip.extend_from_slice(&[0x00, 0x00]); // GPB flag
    zip.extend_from_slice(&[0x00, 0x00]); // Compression method
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Last mod time/date
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // CRC32
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Compressed size
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Uncompressed size
    zip.extend_from_slice(&[0x04, 0x00]); // Filename length
    zip.extend_from_slice(&[0x00, 0x00]); // Extra field length
    zip.extend_from_slice(&[0x00, 0x00]); // File comment length
    zip.extend_from_slice(&[0x00, 0x00]); // Disk number
    zip.extend_from_slice(&[0x00, 0x00]); // Internal attributes
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // External attributes
    zip.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // Local header offset
    zip.extend_from_slice(b"test"); // Filename

    // End of central directory
    zip.extend_from_slice(&[0x50, 0x4B, 0x05, 0x06]); // EOCDS
    zip.extend_from_slice(&[0x00, 0x00]); // Disk number
    zip.extend_from_slice(&[0x00, 0x00]); // CD disk number
    zip.extend_from_slice(&[0x01, 0x00]); // Entries on this disk
    zip.extend_from_slice(&[0x01, 0x00]); // Total entries
    zip.extend_from_slice(&[0x32, 0x00, 0x00, 0x00]); // CD size (50 bytes)
    zip.extend_from_slice(&[0x22, 0x00, 0x00, 0x00]); // CD offset (34 bytes from start)
    zip.extend_from_slice(&[0x00, 0x00]); // Comment length

    zip
}

/// Stored (uncompressed) archive built with the `zip` crate
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = ::zip::write::SimpleFileOptions::default()
        .compression_method(::zip::CompressionMethod::Stored);

    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// Names and contents of every entry, read back with the `zip` crate
pub fn read_zip_entries(data: &[u8]) -> Vec<(String, Vec<u8>)> {
    use std::io::Read;

    let mut archive = ::zip::ZipArchive::new(Cursor::new(data)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

/// Deterministic filler that never forms a ZIP or PNG signature
pub fn pattern_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 | 0x80).collect()
}
