//! DOCX format detection and validation.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect a DOCX container from a file path.
///
/// # Arguments
/// * `path` - Path to the file
///
/// # Returns
/// * `Ok(())` if the file starts with a ZIP local file header
/// * `Err(Error::UnknownFormat)` otherwise
///
/// # Example
/// ```no_run
/// use docfill::detect::detect_format_from_path;
///
/// detect_format_from_path("templates/recibo.docx").unwrap();
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 4];
    reader
        .read_exact(&mut header)
        .map_err(|_| Error::UnknownFormat)?;
    detect_format_from_bytes(&header)
}

/// Detect a DOCX container from bytes.
///
/// Only the container is checked here; the presence of the main document
/// part is verified when the package is opened.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<()> {
    if data.starts_with(ZIP_MAGIC) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if a file looks like a DOCX package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes look like a DOCX package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
