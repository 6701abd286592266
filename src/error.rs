//! Error types for unchat library.

use std::io;
use thiserror::Error;

/// Result type alias for unchat operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during extraction and export.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSS selector from the platform configuration could not be parsed.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A full extraction pass produced no messages or files.
    #[error("No content found")]
    NoContentFound,

    /// A modal or copy surface never appeared.
    #[error("Surface did not appear within {timeout_ms}ms")]
    SurfaceTimeout {
        /// Poll bound that elapsed
        timeout_ms: u64,
    },

    /// A surface could not be confirmed closed.
    #[error("Surface did not close within {timeout_ms}ms")]
    CloseTimeout {
        /// Poll bound that elapsed
        timeout_ms: u64,
    },

    /// Reading the system clipboard failed.
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// The page driver failed to perform an operation.
    #[error("Page error: {0}")]
    Page(String),

    /// A downstream sink or renderer failed while producing output.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid platform configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is confined to a single element and must not abort
    /// the surrounding extraction pass.
    pub fn is_element_level(&self) -> bool {
        matches!(
            self,
            Error::SurfaceTimeout { .. }
                | Error::CloseTimeout { .. }
                | Error::Clipboard(_)
                | Error::Page(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoContentFound;
        assert_eq!(err.to_string(), "No content found");

        let err = Error::SurfaceTimeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Surface did not appear within 5000ms");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_element_level_classification() {
        assert!(Error::CloseTimeout { timeout_ms: 3000 }.is_element_level());
        assert!(Error::Clipboard("denied".into()).is_element_level());
        assert!(!Error::NoContentFound.is_element_level());
        assert!(!Error::Serialization("zip".into()).is_element_level());
    }
}
