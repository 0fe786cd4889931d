//! Validation outcomes and helpers shared with the command-line front end

use std::fmt;
use std::path::Path;

/// Validation result for container files
#[derive(Debug, PartialEq)]
pub enum ValidationResult {
    /// File is a decodable PNG carrying a readable ZIP
    Valid,
    /// Invalid PNG with error message
    InvalidPng(String),
    /// Invalid or missing ZIP with error message
    InvalidZip(String),
    /// Both PNG and ZIP are invalid
    InvalidBoth(String, String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationResult::Valid => write!(f, "[OK] File is a valid PNG carrying a ZIP archive"),
            ValidationResult::InvalidPng(reason) => write!(f, "[ERROR] Not a valid PNG: {}", reason),
            ValidationResult::InvalidZip(reason) => write!(f, "[ERROR] No valid ZIP inside: {}", reason),
            ValidationResult::InvalidBoth(png_reason, zip_reason) => write!(
                f,
                "[ERROR] Invalid PNG: {}\n         Invalid ZIP: {}",
                png_reason, zip_reason
            ),
        }
    }
}

/// Document name derived from an archive path: file name without `.zip`
pub fn document_name(zip_path: &Path) -> String {
    let file_name = zip_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match file_name.strip_suffix(".zip") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ if file_name.is_empty() => "archive".to_string(),
        _ => file_name,
    }
}
