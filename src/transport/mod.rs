//! Base64 and data URL transport for containers and archives

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::{ContainerError, ContainerResult};

/// MIME type used when a data URL is built without one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Standard alphabet, padded on encode, padding optional on decode
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const DATA_URL_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Encode bytes as padded standard Base64
pub fn to_base64(bytes: &[u8]) -> String {
    ENGINE.encode(bytes)
}

/// Decode standard Base64. The empty string decodes to no bytes.
pub fn from_base64(text: &str) -> ContainerResult<Vec<u8>> {
    let body = text.trim_end_matches('=');
    let padding = text.len() - body.len();

    if padding > 2 || !body.bytes().all(is_base64_symbol) {
        return Err(ContainerError::InvalidBase64);
    }

    ENGINE.decode(text).map_err(|_| ContainerError::InvalidBase64)
}

/// Wrap bytes as `data:<mime>;base64,<payload>`
pub fn to_data_url(bytes: &[u8], mime_type: Option<&str>) -> String {
    format!(
        "{}{}{}{}",
        DATA_URL_SCHEME,
        mime_type.unwrap_or(DEFAULT_MIME_TYPE),
        BASE64_MARKER,
        to_base64(bytes)
    )
}

/// Decode the payload of a `data:<mime>;base64,<payload>` URL
pub fn from_data_url(text: &str) -> ContainerResult<Vec<u8>> {
    let rest = text
        .strip_prefix(DATA_URL_SCHEME)
        .ok_or(ContainerError::InvalidDataUrl)?;
    let (mime_type, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or(ContainerError::InvalidDataUrl)?;

    if mime_type.is_empty() || mime_type.contains(';') || payload.is_empty() {
        return Err(ContainerError::InvalidDataUrl);
    }

    from_base64(payload)
}

fn is_base64_symbol(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'/'
}
