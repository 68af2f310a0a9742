//! Word-processing document extractor.

use std::path::Path;

use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::ExtractionResult;

use super::Extractor;

/// Extracts paragraphs and tables from `.docx` files.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor {
    _private: (),
}

impl DocxExtractor {
    /// Create a new document extractor.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Extractor for DocxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        crate::extract_document(path).map(Into::into)
    }

    fn extract_bytes(&self, bytes: &[u8], name: &str) -> Result<ExtractionResult> {
        crate::extract_document_bytes(bytes, name).map(Into::into)
    }
}
