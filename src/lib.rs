//! # ZIP-as-PNG container codec
//!
//! This library embeds an arbitrary ZIP archive inside a PNG image as a private
//! ancillary chunk (`ziPc`) placed right after `IHDR`, and recovers the original
//! archive byte-for-byte.
//!
//! PNG readers skip the unknown chunk, so the result still displays as the
//! original image. The ZIP's central directory offsets are shifted while the
//! archive lives inside the PNG and shifted back on extraction.

// Public API exports
pub mod cli;
pub mod png;
pub mod zip;
pub mod embed;
pub mod extract;
pub mod transport;
pub mod html;
pub mod utils;

#[cfg(test)]
pub(crate) mod fixtures;

pub use embed::embed;
pub use extract::{extract, inspect, locate_container_chunk, validate_container};
pub use html::generate_html;
pub use transport::{from_base64, from_data_url, to_base64, to_data_url};

/// Result type alias for container operations
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Error type for the container codec and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("Invalid PNG header")]
    InvalidPngHeader,

    #[error("PNG already contains an EOCD signature")]
    PngContainsEocdSignature,

    #[error("EOCD signature not found")]
    EocdNotFound,

    #[error("Invalid ZIP structure: {0}")]
    InvalidZipStructure(String),

    #[error("Container chunk not found")]
    ContainerChunkNotFound,

    #[error("Chunk {tag} declares {declared} bytes but only {available} remain")]
    TruncatedChunk {
        tag: String,
        declared: usize,
        available: usize,
    },

    #[error("ZIP of {0} bytes does not fit in a PNG chunk")]
    PayloadTooLarge(usize),

    #[error("Invalid Base64 string")]
    InvalidBase64,

    #[error("Invalid Data URL format")]
    InvalidDataUrl,
}

impl ContainerError {
    /// Shorthand for a structural ZIP failure
    pub(crate) fn zip_structure(reason: impl Into<String>) -> Self {
        ContainerError::InvalidZipStructure(reason.into())
    }
}
