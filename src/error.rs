//! Error types for docfill library.

use std::io;
use thiserror::Error;

/// Result type alias for docfill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reading, filling or generating documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as a DOCX package.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// A required part is missing from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error reading or writing the ZIP container.
    #[error("ZIP container error: {0}")]
    Zip(String),

    /// Error parsing or writing XML content.
    #[error("XML error: {0}")]
    Xml(String),

    /// Generation was requested without a patient name.
    #[error("Patient name is required")]
    MissingPatientName,

    /// The supplied credentials were rejected.
    #[error("Access denied")]
    AccessDenied,

    /// The credential store could not be loaded.
    #[error("Credential store error: {0}")]
    Credentials(String),

    /// A placeholder assignment could not be parsed.
    #[error("Invalid placeholder assignment: {0}")]
    InvalidPlaceholder(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Credentials(err.to_string())
    }
}
