//! Error types for the papermill library.

use std::io;
use thiserror::Error;

/// Result type alias for papermill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while structuring and indexing a paper.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The layout oracle produced no usable page layout.
    #[error("Malformed layout: {0}")]
    MalformedLayout(String),

    /// The layout oracle itself failed.
    #[error("Layout analysis error: {0}")]
    LayoutAnalysis(String),

    /// A figure crop fell outside the rendered page raster.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error during markdown rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// The embedding tokenizer could not be loaded, even after a
    /// forced re-fetch.
    #[error("Tokenizer unavailable: {0}")]
    TokenizerUnavailable(String),

    /// A relational or vector store write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An embedding call failed.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Error decoding serialized layout data.
    #[error("Layout decode error: {0}")]
    LayoutDecode(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::LayoutDecode(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageExtract(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MalformedLayout("empty page set".to_string());
        assert_eq!(err.to_string(), "Malformed layout: empty page set");

        let err = Error::Storage("connection refused".to_string());
        assert_eq!(err.to_string(), "Storage error: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
