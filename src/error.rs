//! Custom error types and result handling for Ikou operations.
//!
//! This module defines the comprehensive error handling system used throughout Ikou.
//! All operations return a [`Result<T>`] which is a type alias for `std::result::Result<T, Error>`.
//!
use std::path::PathBuf;

/// Type alias for Results with Ikou errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all Ikou operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Image decoding/processing errors
    #[error(transparent)]
    Image(#[from] image::ImageError),
    /// PDF construction and parsing errors
    #[error(transparent)]
    Pdf(#[from] lopdf::Error),
    /// XML reader errors while walking an export document
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    /// Base64 payload decoding errors
    #[error(transparent)]
    Decode(#[from] base64::DecodeError),
    /// Run-log (de)serialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    MigrationBuilder(#[from] crate::migrate::MigrationConfigBuilderError),
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for export files that could not be parsed as ENEX
    #[error("Malformed export file '{0:?}': {1}")]
    Parse(PathBuf, String),
    /// Error for attachments missing a required field (mime type or data)
    #[error("Missing field: {0}")]
    MissingField(String),
    /// Error for text or images that could not become a PDF page
    #[error("Render failed: {0}")]
    Render(String),
    /// Error for failed PDF composition
    #[error("Merge failed: {0}")]
    Merge(String),
    /// Error for missing required external input (fatal, aborts the run)
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Error for resources that couldn't be found (e.g., input directory)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

// Basic From<String> conversion for convenience
impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}
