//! Error types for docextract.
//!
//! Two tiers: [`Error`] is fatal for the file being processed, while
//! [`Degradation`] records a page- or sheet-local failure that was absorbed
//! and reported alongside an otherwise complete result.

use std::io;
use thiserror::Error;

use crate::detect::DocumentKind;

/// Result type alias for docextract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort processing of a whole file.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading inputs or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file cannot be opened or parsed as its declared format.
    #[error("Malformed {kind} document: {reason}")]
    MalformedDocument {
        /// Format the file was opened as.
        kind: DocumentKind,
        /// What went wrong.
        reason: String,
    },

    /// No extractor handles this file.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error while serializing a result.
    #[error("Rendering error: {0}")]
    Render(String),

    /// A configuration value is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl Error {
    /// Build a [`Error::MalformedDocument`].
    pub fn malformed(kind: DocumentKind, reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            kind,
            reason: reason.into(),
        }
    }

    /// Whether this error means the input itself is unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedDocument { .. })
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => {
                Error::malformed(DocumentKind::Pdf, "document is encrypted")
            }
            _ => Error::malformed(DocumentKind::Pdf, err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            _ => Error::malformed(DocumentKind::Docx, err.to_string()),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::malformed(DocumentKind::Docx, format!("invalid XML: {}", err))
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        match err {
            calamine::Error::Io(e) => Error::Io(e),
            _ => Error::malformed(DocumentKind::Spreadsheet, err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

/// A non-fatal failure confined to one page or one sheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Text or table detection failed on a page; that page carries empty
    /// text and/or no tables.
    #[error("page {page_number}: detection degraded: {reason}")]
    DetectionDegraded {
        /// 1-based page number.
        page_number: u32,
        /// What went wrong.
        reason: String,
    },

    /// One sheet of a workbook could not be read and was omitted.
    #[error("sheet '{sheet_name}' unreadable: {reason}")]
    UnreadableSheet {
        /// Sheet name as listed by the workbook.
        sheet_name: String,
        /// What went wrong.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed(DocumentKind::Docx, "missing word/document.xml");
        assert_eq!(
            err.to_string(),
            "Malformed docx document: missing word/document.xml"
        );
        assert!(err.is_malformed());

        let err = Error::UnsupportedFormat("txt".into());
        assert_eq!(err.to_string(), "Unsupported format: txt");
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_degradation_display() {
        let d = Degradation::DetectionDegraded {
            page_number: 3,
            reason: "no content stream".into(),
        };
        assert_eq!(d.to_string(), "page 3: detection degraded: no content stream");

        let d = Degradation::UnreadableSheet {
            sheet_name: "Data".into(),
            reason: "bad xml".into(),
        };
        assert_eq!(d.to_string(), "sheet 'Data' unreadable: bad xml");
    }
}
