//! PDF extractor.

use std::path::Path;

use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::ExtractionResult;
use crate::pdf::PdfOptions;

use super::Extractor;

/// Extracts per-page text and ruled-line tables from PDF files.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    options: PdfOptions,
}

impl PdfExtractor {
    /// Create a PDF extractor with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a PDF extractor with custom tolerances.
    pub fn with_options(options: PdfOptions) -> Self {
        Self { options }
    }

    /// Tolerances in use.
    pub fn options(&self) -> &PdfOptions {
        &self.options
    }
}

impl Extractor for PdfExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        crate::extract_pdf(path, &self.options).map(Into::into)
    }

    fn extract_bytes(&self, bytes: &[u8], name: &str) -> Result<ExtractionResult> {
        crate::extract_pdf_bytes(bytes, name, &self.options).map(Into::into)
    }
}
