//! Centralized error types for mailsift.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailsift library.
///
/// Every extraction step (container parsing, attachment persistence and PDF
/// text extraction) returns this type, so the caller decides per step whether
/// to continue or abort.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The Outlook item could not be read.
    #[error("Failed to parse MSG file '{path}': {reason}")]
    MsgParse { path: PathBuf, reason: String },

    /// The internet message could not be parsed.
    #[error("Failed to parse EML file: {0}")]
    EmlParse(PathBuf),

    /// An attachment payload could not be decoded into raw bytes.
    #[error("Cannot decode payload of attachment '{filename}': {reason}")]
    AttachmentDecode { filename: String, reason: String },

    /// The attachment name cannot be used as a file name in the output directory.
    #[error("Invalid attachment filename: {0:?}")]
    InvalidFilename(String),

    /// The PDF could not be loaded or its text could not be extracted.
    #[error("{0}")]
    Pdf(String),

    /// The PDF is encrypted.
    #[error("PDF is encrypted: {0}")]
    EncryptedPdf(PathBuf),

    /// Writing to the report sink failed.
    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

/// Convenience alias for `Result<T, ExtractError>`.
pub type Result<T> = std::result::Result<T, ExtractError>;

impl ExtractError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// A missing file is reported as [`ExtractError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let err = ExtractError::io(
            "missing.eml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ExtractError::FileNotFound(_)));
        assert_eq!(err.to_string(), "File not found: missing.eml");
    }

    #[test]
    fn test_io_other_keeps_path() {
        let err = ExtractError::io(
            "attachments/a.bin",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("attachments/a.bin"));
        assert!(err.to_string().contains("denied"));
    }
}
